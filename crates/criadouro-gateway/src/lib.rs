#![warn(missing_docs)]
//! # criadouro-gateway
//!
//! ## Purpose
//! Wraps the detection backend's REST endpoints: login, campaign and result
//! fetches, feedback updates, and the multipart image upload.
//!
//! ## Responsibilities
//! - Execute requests through an injectable [`HttpTransport`].
//! - Attach session auth headers to every authenticated call.
//! - Map JSON bodies into the canonical domain types and raise on non-2xx.
//! - Classify failures for the friendly-message layer.
//!
//! ## Data flow
//! Screen/orchestration code -> gateway method -> [`HttpTransport`] ->
//! backend; the decoded response flows back as canonical `criadouro-core`
//! values.
//!
//! ## Ownership and lifetimes
//! Gateways own a [`BackendConfig`] and share one transport through `Arc`;
//! the [`Session`] context is borrowed per call so fakes can be injected in
//! tests.
//!
//! ## Error model
//! One [`GatewayError`] enum: endpoint policy violations, transport
//! failures, non-2xx statuses, and decode failures. No call is retried; a
//! hung request is bounded by the transport timeout.
//!
//! ## Security and privacy notes
//! Tokens travel only inside headers composed by the session crate and are
//! never logged. Upload logging records the content digest, not the bytes.

use std::sync::Arc;
use std::time::Duration;

use criadouro_core::{
    AnalysisResult, CampaignRecord, Coordinates, RawResultRecord, SiteType, canonicalize_result,
};
use criadouro_feedback::{FeedbackError, FeedbackSubmission, FeedbackSubmitter};
use criadouro_session::{Session, SessionError, UserProfile};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

/// HTTP methods used by the backend contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Read.
    Get,
    /// Create.
    Post,
    /// Update.
    Put,
}

/// Request body variants used by the backend contract.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// Pre-serialized JSON document.
    Json(String),
    /// Multipart form with one file part.
    Multipart(MultipartForm),
}

/// Multipart form: plain text fields plus one file part.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartForm {
    /// Plain text fields in submission order.
    pub fields: Vec<(String, String)>,
    /// The uploaded file.
    pub file: FilePart,
}

/// One file part of a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    /// Form field name.
    pub name: String,
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type of the bytes.
    pub mime_type: String,
    /// File content.
    pub bytes: Vec<u8>,
}

/// One request as handed to the transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute endpoint URL.
    pub url: Url,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: RequestBody,
}

/// One response as returned by the transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl HttpResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract transport executing one request.
pub trait HttpTransport: Send + Sync {
    /// Executes the request and returns status plus body.
    ///
    /// # Errors
    /// Returns [`GatewayError::Network`] when the request never produced a
    /// response (DNS, connect, timeout). Non-2xx responses are NOT errors at
    /// this layer; gateways decide.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, GatewayError>;
}

/// Production transport over a blocking HTTP client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Creates a transport with the given request timeout.
    ///
    /// The timeout is a deliberate hardening deviation: the source client
    /// had none and a hung call left the screen loading forever.
    ///
    /// # Errors
    /// Returns [`GatewayError::Network`] when the client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| GatewayError::Network(error.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, GatewayError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(request.url),
            Method::Post => self.client.post(request.url),
            Method::Put => self.client.put(request.url),
        };

        // The multipart encoder owns the Content-Type (boundary included);
        // a session-composed JSON content type must not override it.
        let multipart = matches!(request.body, RequestBody::Multipart(_));
        for (name, value) in &request.headers {
            if multipart && name.eq_ignore_ascii_case("content-type") {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.body(body),
            RequestBody::Multipart(form) => {
                let mut encoded = reqwest::blocking::multipart::Form::new();
                for (name, value) in form.fields {
                    encoded = encoded.text(name, value);
                }
                let part = reqwest::blocking::multipart::Part::bytes(form.file.bytes)
                    .file_name(form.file.file_name)
                    .mime_str(&form.file.mime_type)
                    .map_err(|error| GatewayError::Network(error.to_string()))?;
                builder.multipart(encoded.part(form.file.name, part))
            }
        };

        let response = builder
            .send()
            .map_err(|error| GatewayError::Network(error.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|error| GatewayError::Network(error.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

/// Validated backend endpoint configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    base_url: Url,
}

impl BackendConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    /// Returns [`GatewayError::InvalidEndpoint`] when the URL does not parse
    /// or is not HTTPS.
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        let parsed = Url::parse(base_url)
            .map_err(|error| GatewayError::InvalidEndpoint(error.to_string()))?;
        if parsed.scheme() != "https" {
            return Err(GatewayError::InvalidEndpoint(
                "backend endpoint must use https".to_string(),
            ));
        }
        Ok(Self { base_url: parsed })
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path)
            .map_err(|error| GatewayError::InvalidEndpoint(error.to_string()))
    }
}

fn authenticated_headers(session: &Session) -> Result<Vec<(String, String)>, GatewayError> {
    let mut headers = session.auth_headers()?;
    headers.push(("Accept".to_string(), "application/json".to_string()));
    Ok(headers)
}

fn require_success(response: HttpResponse) -> Result<HttpResponse, GatewayError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(GatewayError::Status {
            status: response.status,
            body: response.body,
        })
    }
}

/// Login endpoint wrapper.
pub struct AuthGateway {
    config: BackendConfig,
    transport: Arc<dyn HttpTransport>,
}

/// Decoded login outcome.
///
/// The backend sometimes omits the token; the login flow then synthesizes a
/// local one, so the field stays optional here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Authenticated user profile.
    pub profile: UserProfile,
    /// Server-issued bearer token, when present and non-blank.
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponseBody {
    profile: UserProfile,
    #[serde(default)]
    token: Option<String>,
}

impl AuthGateway {
    /// Creates the gateway.
    pub fn new(config: BackendConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// `POST /user/login` with the given credentials.
    ///
    /// # Errors
    /// Returns [`GatewayError::Status`] for rejected credentials (401) and
    /// transport/decode errors otherwise.
    pub fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, GatewayError> {
        let url = self.config.endpoint("user/login")?;
        let body = json!({ "email": email, "password": password }).to_string();

        let response = self.transport.execute(HttpRequest {
            method: Method::Post,
            url,
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
            body: RequestBody::Json(body),
        })?;
        let response = require_success(response)?;

        let decoded: LoginResponseBody = serde_json::from_str(&response.body)?;
        Ok(LoginOutcome {
            profile: decoded.profile,
            token: decoded.token.filter(|token| !token.trim().is_empty()),
        })
    }
}

/// Campaign endpoints wrapper.
pub struct CampaignGateway {
    config: BackendConfig,
    transport: Arc<dyn HttpTransport>,
}

#[derive(Debug, Deserialize)]
struct CampaignsResponseBody {
    campaigns: Vec<CampaignRecord>,
}

impl CampaignGateway {
    /// Creates the gateway.
    pub fn new(config: BackendConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// `GET /campaigns/getCampaignByUser/{userId}`.
    ///
    /// # Errors
    /// Returns status/transport/decode errors.
    pub fn campaigns_by_user(
        &self,
        session: &Session,
        user_id: u64,
    ) -> Result<Vec<CampaignRecord>, GatewayError> {
        let url = self
            .config
            .endpoint(&format!("campaigns/getCampaignByUser/{user_id}"))?;
        let response = self.transport.execute(HttpRequest {
            method: Method::Get,
            url,
            headers: authenticated_headers(session)?,
            body: RequestBody::Empty,
        })?;
        let response = require_success(response)?;

        let decoded: CampaignsResponseBody = serde_json::from_str(&response.body)?;
        Ok(decoded.campaigns)
    }

    /// `GET /campaigns/getCampaign/{id}`.
    ///
    /// # Errors
    /// Returns status/transport/decode errors.
    pub fn campaign(
        &self,
        session: &Session,
        campaign_id: u64,
    ) -> Result<CampaignRecord, GatewayError> {
        let url = self
            .config
            .endpoint(&format!("campaigns/getCampaign/{campaign_id}"))?;
        let response = self.transport.execute(HttpRequest {
            method: Method::Get,
            url,
            headers: authenticated_headers(session)?,
            body: RequestBody::Empty,
        })?;
        let response = require_success(response)?;

        Ok(serde_json::from_str(&response.body)?)
    }
}

/// Result endpoints wrapper.
pub struct ResultGateway {
    config: BackendConfig,
    transport: Arc<dyn HttpTransport>,
}

#[derive(Debug, Deserialize)]
struct ResultsResponseBody {
    results: Vec<RawResultRecord>,
}

impl ResultGateway {
    /// Creates the gateway.
    pub fn new(config: BackendConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// `GET /results/getResultByUser/{userId}`, canonicalized.
    ///
    /// # Errors
    /// Returns status/transport/decode errors, and
    /// [`GatewayError::Canonicalize`] for malformed records.
    pub fn results_by_user(
        &self,
        session: &Session,
        user_id: u64,
    ) -> Result<Vec<AnalysisResult>, GatewayError> {
        let url = self
            .config
            .endpoint(&format!("results/getResultByUser/{user_id}"))?;
        let response = self.transport.execute(HttpRequest {
            method: Method::Get,
            url,
            headers: authenticated_headers(session)?,
            body: RequestBody::Empty,
        })?;
        let response = require_success(response)?;

        let decoded: ResultsResponseBody = serde_json::from_str(&response.body)?;
        decoded
            .results
            .into_iter()
            .map(|record| canonicalize_result(record).map_err(GatewayError::from))
            .collect()
    }

    /// `GET /results/getResult/{id}`, canonicalized.
    ///
    /// # Errors
    /// Returns status/transport/decode/canonicalization errors.
    pub fn result(&self, session: &Session, result_id: u64) -> Result<AnalysisResult, GatewayError> {
        let url = self
            .config
            .endpoint(&format!("results/getResult/{result_id}"))?;
        let response = self.transport.execute(HttpRequest {
            method: Method::Get,
            url,
            headers: authenticated_headers(session)?,
            body: RequestBody::Empty,
        })?;
        let response = require_success(response)?;

        let record: RawResultRecord = serde_json::from_str(&response.body)?;
        Ok(canonicalize_result(record)?)
    }
}

/// Feedback endpoint wrapper.
pub struct FeedbackGateway {
    config: BackendConfig,
    transport: Arc<dyn HttpTransport>,
}

impl FeedbackGateway {
    /// Creates the gateway.
    pub fn new(config: BackendConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// `PUT /results/updateResultFeedback`.
    ///
    /// The comment is always sent, as an empty string when blank. Success is
    /// the HTTP status alone; some backend versions answer with a non-JSON
    /// body, which is ignored.
    ///
    /// # Errors
    /// Returns status/transport errors. Never retries.
    pub fn update_feedback(
        &self,
        session: &Session,
        result_id: u64,
        like: bool,
        comment: &str,
    ) -> Result<(), GatewayError> {
        let url = self.config.endpoint("results/updateResultFeedback")?;
        let body = json!({ "id": result_id, "like": like, "comment": comment }).to_string();

        let response = self.transport.execute(HttpRequest {
            method: Method::Put,
            url,
            headers: authenticated_headers(session)?,
            body: RequestBody::Json(body),
        })?;
        require_success(response)?;
        Ok(())
    }
}

/// Adapts [`FeedbackGateway`] to the feedback machine's submitter port.
pub struct SessionFeedbackSubmitter {
    gateway: FeedbackGateway,
    session: Arc<Session>,
}

impl SessionFeedbackSubmitter {
    /// Creates a submitter bound to one session.
    pub fn new(gateway: FeedbackGateway, session: Arc<Session>) -> Self {
        Self { gateway, session }
    }
}

impl FeedbackSubmitter for SessionFeedbackSubmitter {
    fn submit(&self, submission: &FeedbackSubmission) -> Result<(), FeedbackError> {
        self.gateway
            .update_feedback(
                &self.session,
                submission.result_id,
                submission.like,
                &submission.comment,
            )
            .map_err(|error| FeedbackError::Submission(error.to_string()))
    }
}

/// Image file handed to the upload gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type of the bytes.
    pub mime_type: String,
    /// Encoded image content.
    pub bytes: Vec<u8>,
}

/// One capture submission.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    /// The photographed image.
    pub image: ImageFile,
    /// Submitting user.
    pub user_id: u64,
    /// Owning campaign; `None` for unlinked submissions.
    pub campaign_id: Option<u64>,
    /// Location classification chosen at capture time.
    pub site_type: SiteType,
    /// Device coordinates, when available.
    pub coordinates: Option<Coordinates>,
}

/// Receipt returned by a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Backend-assigned result identifier for the new analysis.
    pub result_id: u64,
    /// Server-side URI of the stored image.
    pub uploaded_image: String,
    /// SHA-256 hex digest of the submitted bytes, for traceability.
    pub content_digest: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponseBody {
    result_id: u64,
    #[serde(default)]
    uploaded_image: String,
}

/// Form value for the `campaignId` field: `"0"` for unlinked submissions.
pub fn campaign_form_value(campaign_id: Option<u64>) -> String {
    campaign_id.unwrap_or(0).to_string()
}

/// Form value for the `coordinates` field.
///
/// Known coordinates serialize as `{"lat":..,"lng":..}`; unknown ones as the
/// explicit `{"lat":null,"lng":null}` document the backend expects.
pub fn coordinates_form_value(coordinates: Option<Coordinates>) -> String {
    match coordinates {
        Some(point) => json!({ "lat": point.lat, "lng": point.lng }).to_string(),
        None => json!({ "lat": null, "lng": null }).to_string(),
    }
}

/// Upload endpoint wrapper.
pub struct UploadGateway {
    config: BackendConfig,
    transport: Arc<dyn HttpTransport>,
}

impl UploadGateway {
    /// Creates the gateway.
    pub fn new(config: BackendConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// `POST /results/uploadImage` as multipart form data.
    ///
    /// # Errors
    /// Returns status/transport/decode errors. Never retries.
    pub fn upload_image(
        &self,
        session: &Session,
        request: UploadRequest,
    ) -> Result<UploadReceipt, GatewayError> {
        let url = self.config.endpoint("results/uploadImage")?;
        let content_digest = hex::encode(Sha256::digest(&request.image.bytes));

        let form = MultipartForm {
            fields: vec![
                ("userId".to_string(), request.user_id.to_string()),
                ("campaignId".to_string(), campaign_form_value(request.campaign_id)),
                ("type".to_string(), request.site_type.wire_name().to_string()),
                ("coordinates".to_string(), coordinates_form_value(request.coordinates)),
            ],
            file: FilePart {
                name: "file".to_string(),
                file_name: request.image.file_name,
                mime_type: request.image.mime_type,
                bytes: request.image.bytes,
            },
        };

        let response = self.transport.execute(HttpRequest {
            method: Method::Post,
            url,
            headers: authenticated_headers(session)?,
            body: RequestBody::Multipart(form),
        })?;
        let response = require_success(response)?;

        let decoded: UploadResponseBody = serde_json::from_str(&response.body)?;
        log::info!(
            "image upload accepted: result_id={} digest={content_digest}",
            decoded.result_id
        );

        Ok(UploadReceipt {
            result_id: decoded.result_id,
            uploaded_image: decoded.uploaded_image,
            content_digest,
        })
    }
}

/// Failure bucket used by the friendly-message layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Missing/invalid session (HTTP 401/403).
    NotAuthenticated,
    /// Request never reached the backend (DNS, connect, timeout).
    Network,
    /// Backend-side failure (HTTP 5xx).
    Server,
    /// Resource does not exist (HTTP 404).
    NotFound,
    /// Anything else.
    Other,
}

/// Buckets one gateway error for user-facing guidance.
pub fn classify_gateway_error(error: &GatewayError) -> FailureClass {
    match error {
        GatewayError::Network(_) => FailureClass::Network,
        GatewayError::Status { status: 401 | 403, .. } => FailureClass::NotAuthenticated,
        GatewayError::Status { status: 404, .. } => FailureClass::NotFound,
        GatewayError::Status { status, .. } if *status >= 500 => FailureClass::Server,
        _ => FailureClass::Other,
    }
}

/// Gateway error type.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Endpoint URL violates configuration policy.
    #[error("invalid backend endpoint: {0}")]
    InvalidEndpoint(String),
    /// Request never produced an HTTP response.
    #[error("network failure: {0}")]
    Network(String),
    /// Backend answered with a non-2xx status.
    #[error("backend returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body kept for diagnostics.
        body: String,
    },
    /// Response body was not the expected JSON shape.
    #[error("response decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Record canonicalization failure.
    #[error("record canonicalization failure: {0}")]
    Canonicalize(#[from] criadouro_core::CoreError),
    /// Session storage failure while composing headers.
    #[error("session failure: {0}")]
    Session(#[from] SessionError),
}
