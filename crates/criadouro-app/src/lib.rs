#![warn(missing_docs)]
//! # criadouro-app
//!
//! ## Purpose
//! Orchestrates session, gateways, feedback, address lookup, and view state
//! for the breeding-site detection client.
//!
//! ## Responsibilities
//! - Run the login/logout flow, including local validation and the
//!   local-token fallback for backends that omit one.
//! - Load campaigns and user analyses for the overview screens.
//! - Drive feedback confirmation and capture upload.
//! - Translate failures into the screen-facing guidance texts.
//!
//! ## Data flow
//! Screen event -> orchestration function -> gateway/session/feedback crate
//! -> canonical values or [`AppError`] back to the caller.
//!
//! ## Ownership and lifetimes
//! Functions borrow the session and gateways per call; nothing here holds
//! global mutable state.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. Validation failures are
//! resolved locally and never reach the network.
//!
//! ## Security and privacy notes
//! Credentials are borrowed for the duration of one login call and are
//! never logged.

use criadouro_address::{CepAddress, GeocodingClient, ViaCepClient};
use criadouro_core::{
    AnalysisResult, CampaignDetail, CampaignSummary, Coordinates, SiteType, campaign_detail,
    summarize_campaign,
};
use criadouro_feedback::{FeedbackError, FeedbackMachine, FeedbackSubmitter, SubmittedFeedback};
use criadouro_gateway::{
    AuthGateway, CampaignGateway, GatewayError, ImageFile, ResultGateway, UploadGateway,
    UploadReceipt, UploadRequest, classify_gateway_error,
};
use criadouro_session::{Session, SessionError, UserProfile, synthesize_local_token};
use criadouro_ui::{AddressInfo, generic_error_message, is_valid_email, login_error_message};
use rand::Rng;
use thiserror::Error;

/// Build-time application version loaded from the root `VERSION` file.
pub const APP_VERSION: &str = env!("CRIADOURO_VERSION");

/// Production backend endpoint.
pub const DEFAULT_API_BASE_URL: &str =
    "https://deteccao-criadouro-api-949210563435.southamerica-east1.run.app";

/// Env var overriding the backend endpoint.
pub const API_BASE_URL_ENV: &str = "CRIADOURO_API_BASE_URL";

/// Returns the app version sourced from the root `VERSION` file.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Returns the backend base URL, honoring the env override.
pub fn backend_base_url_from_env() -> String {
    std::env::var(API_BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
}

/// Per-request timeout applied by the production transports.
///
/// Hardening deviation from the source client, which had no timeout and
/// could leave a screen loading indefinitely on a hung call.
pub const DEFAULT_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

/// Builds the production HTTP transport with the default timeout.
///
/// # Errors
/// Returns gateway errors when the underlying client cannot be built.
pub fn default_transport() -> Result<criadouro_gateway::ReqwestTransport, AppError> {
    Ok(criadouro_gateway::ReqwestTransport::new(DEFAULT_REQUEST_TIMEOUT)?)
}

/// Runs the login flow: local validation, backend call, session save.
///
/// When the backend omits a token the session still needs one for header
/// composition, so a local token is synthesized from `rng`.
///
/// # Errors
/// Returns [`AppError::Validation`] before any network call for empty
/// fields or a malformed email, and gateway/session errors afterwards.
pub fn login<R: Rng>(
    auth: &AuthGateway,
    session: &Session,
    rng: &mut R,
    email: &str,
    password: &str,
) -> Result<UserProfile, AppError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Por favor, preencha todos os campos".to_string(),
        ));
    }
    if !is_valid_email(email) {
        return Err(AppError::Validation(
            "Por favor, digite um email válido".to_string(),
        ));
    }

    let outcome = auth.login(email, password)?;
    let token = outcome
        .token
        .unwrap_or_else(|| synthesize_local_token(rng));
    session.save(&token, &outcome.profile)?;

    Ok(outcome.profile)
}

/// Clears the stored session.
///
/// # Errors
/// Returns session storage errors.
pub fn logout(session: &Session) -> Result<(), AppError> {
    session.clear()?;
    Ok(())
}

/// Returns the authenticated profile or fails with a login-required error.
///
/// # Errors
/// Returns [`AppError::NotAuthenticated`] when no session is stored.
pub fn authenticated_user(session: &Session) -> Result<UserProfile, AppError> {
    match session.user()? {
        Some(profile) if session.is_authenticated()? => Ok(profile),
        _ => Err(AppError::NotAuthenticated),
    }
}

/// Loads campaign summaries for the authenticated user.
///
/// # Errors
/// Returns [`AppError::NotAuthenticated`] without a session and gateway
/// errors otherwise.
pub fn load_campaign_summaries(
    gateway: &CampaignGateway,
    session: &Session,
    now_ms: i64,
) -> Result<Vec<CampaignSummary>, AppError> {
    let user = authenticated_user(session)?;
    let records = gateway.campaigns_by_user(session, user.id)?;
    let summaries = records
        .iter()
        .map(|record| summarize_campaign(record, now_ms))
        .collect::<Result<Vec<_>, _>>()
        .map_err(GatewayError::from)?;
    Ok(summaries)
}

/// Loads one campaign's detail view.
///
/// # Errors
/// Returns [`AppError::NotAuthenticated`] without a session and gateway
/// errors otherwise.
pub fn load_campaign_detail(
    gateway: &CampaignGateway,
    session: &Session,
    campaign_id: u64,
    now_ms: i64,
) -> Result<CampaignDetail, AppError> {
    authenticated_user(session)?;
    let record = gateway.campaign(session, campaign_id)?;
    Ok(campaign_detail(record, now_ms).map_err(GatewayError::from)?)
}

/// Loads all analyses of the authenticated user.
///
/// # Errors
/// Returns [`AppError::NotAuthenticated`] without a session and gateway
/// errors otherwise.
pub fn load_user_results(
    gateway: &ResultGateway,
    session: &Session,
) -> Result<Vec<AnalysisResult>, AppError> {
    let user = authenticated_user(session)?;
    Ok(gateway.results_by_user(session, user.id)?)
}

/// Confirms a pending feedback rating: exactly one submitter call.
///
/// # Errors
/// Propagates machine transition errors and the surfaced submission
/// failure; on failure the machine is editable again with pending values
/// intact.
pub fn confirm_feedback(
    machine: &mut FeedbackMachine,
    submitter: &dyn FeedbackSubmitter,
) -> Result<SubmittedFeedback, AppError> {
    Ok(criadouro_feedback::drive_submit(machine, submitter)?)
}

/// Submits one captured photo as a new analysis.
///
/// # Errors
/// Returns [`AppError::NotAuthenticated`] without a session and gateway
/// errors otherwise.
pub fn submit_capture(
    gateway: &UploadGateway,
    session: &Session,
    image: ImageFile,
    site_type: SiteType,
    campaign_id: Option<u64>,
    coordinates: Option<Coordinates>,
) -> Result<UploadReceipt, AppError> {
    let user = authenticated_user(session)?;
    let receipt = gateway.upload_image(
        session,
        UploadRequest {
            image,
            user_id: user.id,
            campaign_id,
            site_type,
            coordinates,
        },
    )?;
    Ok(receipt)
}

/// Resolves the address behind a CEP for the registration flow.
///
/// Lookup failures are logged and collapse to `None`; the user keeps typing
/// the address by hand.
pub fn resolve_registration_address(viacep: &ViaCepClient, cep: &str) -> Option<CepAddress> {
    match viacep.lookup(cep) {
        Ok(address) => address,
        Err(error) => {
            log::warn!("cep lookup failed: {error}");
            None
        }
    }
}

/// Resolves precise coordinates for the confirmed registration address.
///
/// Geocoding failures are logged and collapse to `None`; the submission
/// falls back to coordinates already known.
pub fn final_registration_coordinates(
    geocoder: &GeocodingClient,
    address: &AddressInfo,
) -> Option<Coordinates> {
    match geocoder.final_coordinates(
        &address.street,
        &address.number,
        &address.neighborhood,
        &address.city,
        &address.state,
        &address.cep,
    ) {
        Ok(coordinates) => coordinates,
        Err(error) => {
            log::warn!("geocoding failed: {error}");
            None
        }
    }
}

/// Login-screen guidance for one app error.
pub fn login_screen_message(error: &AppError) -> String {
    match error {
        AppError::Validation(message) => message.clone(),
        AppError::Gateway(gateway_error) => {
            login_error_message(classify_gateway_error(gateway_error)).to_string()
        }
        _ => login_error_message(criadouro_gateway::FailureClass::Other).to_string(),
    }
}

/// Generic screen guidance for one app error.
pub fn screen_message(error: &AppError) -> String {
    match error {
        AppError::Validation(message) => message.clone(),
        AppError::NotAuthenticated => "Usuário não autenticado".to_string(),
        AppError::Gateway(gateway_error) => {
            generic_error_message(classify_gateway_error(gateway_error)).to_string()
        }
        AppError::Feedback(FeedbackError::Submission(_)) => {
            "Não foi possível enviar o feedback. Tente novamente.".to_string()
        }
        AppError::Feedback(feedback_error) => feedback_error.to_string(),
        AppError::Session(session_error) => session_error.to_string(),
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Client-side validation failure; blocks the action locally.
    #[error("{0}")]
    Validation(String),
    /// No stored session; the screen must route to login.
    #[error("user is not authenticated")]
    NotAuthenticated,
    /// Gateway subsystem error.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
    /// Session subsystem error.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    /// Feedback subsystem error.
    #[error("feedback error: {0}")]
    Feedback(#[from] FeedbackError),
}
