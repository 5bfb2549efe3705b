#![warn(missing_docs)]
//! # criadouro-ui
//!
//! ## Purpose
//! Defines the screen-facing view-state model: fetch lifecycle, display
//! mappings, feedback control projection, friendly error texts, and the
//! registration wizard.
//!
//! ## Responsibilities
//! - Track per-screen load/refresh lifecycle, ignoring duplicate refreshes.
//! - Map result statuses and site types to their fixed labels and colors.
//! - Project the feedback machine into enabled/disabled control state.
//! - Translate classified failures into user guidance.
//! - Validate the multi-step registration form locally.
//!
//! ## Data flow
//! Orchestration events mutate [`Resource`] and [`RegistrationForm`];
//! renderers read projections only.
//!
//! ## Ownership and lifetimes
//! View state owns its strings; nothing borrows from domain values beyond a
//! projection call.
//!
//! ## Error model
//! Registration validation returns [`ValidationError`] with user-facing
//! text; everything else favors explicit state over recoverable errors.
//!
//! ## Security and privacy notes
//! Passwords pass through validation only and are never stored in view
//! state beyond the form the user is typing into.

use criadouro_core::{AnalysisResult, Coordinates, Rating, ResultStatus, SiteType};
use criadouro_feedback::{FeedbackMachine, FeedbackPhase};
use criadouro_gateway::FailureClass;
use thiserror::Error;

/// Positive rating accent.
pub const LIKE_COLOR: &str = "#4CAF50";
/// Negative rating accent.
pub const DISLIKE_COLOR: &str = "#F44336";
/// Neutral/unset accent.
pub const NEUTRAL_COLOR: &str = "#9E9E9E";

/// Fixed status color mapping (user affordance consistency).
pub fn status_color(status: ResultStatus) -> &'static str {
    match status {
        ResultStatus::Processing => "#FF9800",
        ResultStatus::Finished => "#2196F3",
        ResultStatus::Visualized => "#4CAF50",
        ResultStatus::Failed => "#F44336",
    }
}

/// Fixed status label mapping.
pub fn status_label(status: ResultStatus) -> &'static str {
    match status {
        ResultStatus::Processing => "Processando",
        ResultStatus::Finished => "Concluída",
        ResultStatus::Visualized => "Visualizada",
        ResultStatus::Failed => "Falhou",
    }
}

/// Display label for the capture classification.
pub fn site_type_label(site_type: SiteType) -> &'static str {
    match site_type {
        SiteType::Land => "Terreno",
        SiteType::Property => "Propriedade",
    }
}

/// Returns `true` when a result should carry the "new analysis" badge:
/// visualized by the backend but not yet rated by the user.
pub fn needs_review(result: &AnalysisResult) -> bool {
    result.status == ResultStatus::Visualized && result.feedback.rating == Rating::Unrated
}

/// Per-screen fetch lifecycle with duplicate-refresh suppression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource<T> {
    phase: ResourcePhase<T>,
    refreshing: bool,
    in_flight: bool,
}

/// Observable phase of one screen resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourcePhase<T> {
    /// Initial load has not completed.
    Loading,
    /// Data is available.
    Loaded(T),
    /// The last fetch failed; the message is user guidance.
    Failed(String),
}

impl<T> Resource<T> {
    /// Creates a resource in the initial loading phase.
    pub fn new() -> Self {
        Self {
            phase: ResourcePhase::Loading,
            refreshing: false,
            in_flight: false,
        }
    }

    /// Marks the initial load as started.
    ///
    /// Returns `false` (and changes nothing) when a fetch is already in
    /// flight; callers must not start a second one.
    pub fn begin_load(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        self.phase = ResourcePhase::Loading;
        true
    }

    /// Marks a pull-to-refresh as started, keeping stale data visible.
    ///
    /// Returns `false` when a fetch is already in flight; the duplicate
    /// refresh request is ignored.
    pub fn begin_refresh(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        self.refreshing = true;
        true
    }

    /// Applies the fetch outcome and clears the in-flight flags.
    pub fn resolve(&mut self, outcome: Result<T, String>) {
        self.in_flight = false;
        self.refreshing = false;
        self.phase = match outcome {
            Ok(data) => ResourcePhase::Loaded(data),
            Err(message) => ResourcePhase::Failed(message),
        };
    }

    /// Returns the current phase.
    pub fn phase(&self) -> &ResourcePhase<T> {
        &self.phase
    }

    /// Returns `true` during the initial load.
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, ResourcePhase::Loading)
    }

    /// Returns `true` while a pull-to-refresh is running.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// Returns loaded data, when present.
    pub fn data(&self) -> Option<&T> {
        match &self.phase {
            ResourcePhase::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the failure message, when present.
    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            ResourcePhase::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Renderable projection of the feedback machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackView {
    /// Whether the thumbs up/down buttons accept taps.
    pub rating_buttons_enabled: bool,
    /// Whether the comment block is shown at all.
    pub comment_visible: bool,
    /// Whether the comment input accepts edits.
    pub comment_editable: bool,
    /// Whether cancel/confirm are available.
    pub confirm_enabled: bool,
    /// Current rating status text ("Sim" / "Não" / prompt).
    pub status_text: &'static str,
    /// Accent color matching the rating status.
    pub status_color: &'static str,
    /// Comment text to render: draft, committed text, or placeholder.
    pub comment_text: String,
    /// Confirm button label; switches while submitting.
    pub submit_label: &'static str,
    /// Whether the submitted acknowledgment banner is shown.
    pub acknowledged: bool,
}

fn rating_status(liked: Option<bool>) -> (&'static str, &'static str) {
    match liked {
        Some(true) => ("Sim", LIKE_COLOR),
        Some(false) => ("Não", DISLIKE_COLOR),
        None => ("Avalie a análise", NEUTRAL_COLOR),
    }
}

/// Projects the feedback machine into control state.
pub fn project_feedback(machine: &FeedbackMachine) -> FeedbackView {
    let phase = machine.phase();
    let current = match phase {
        FeedbackPhase::Submitted => machine
            .submitted()
            .map(|committed| committed.rating.to_wire())
            .unwrap_or(None),
        _ => machine.pending().map(|pending| Some(pending.liked)).unwrap_or(None),
    };
    let (status_text, status_color) = rating_status(current);

    let comment_text = match phase {
        FeedbackPhase::Submitted => machine
            .submitted()
            .and_then(|committed| committed.comment)
            .unwrap_or_else(|| "Nenhum comentário".to_string()),
        _ => machine
            .pending()
            .map(|pending| pending.comment.clone())
            .unwrap_or_default(),
    };

    FeedbackView {
        rating_buttons_enabled: matches!(
            phase,
            FeedbackPhase::Unrated | FeedbackPhase::RatingChosen
        ),
        comment_visible: phase != FeedbackPhase::Unrated,
        comment_editable: phase == FeedbackPhase::RatingChosen,
        confirm_enabled: phase == FeedbackPhase::RatingChosen,
        status_text,
        status_color,
        comment_text,
        submit_label: if phase == FeedbackPhase::Submitting {
            "Enviando..."
        } else {
            "Confirmar"
        },
        acknowledged: phase == FeedbackPhase::Submitted,
    }
}

/// Login-screen guidance for one classified failure.
pub fn login_error_message(class: FailureClass) -> &'static str {
    match class {
        FailureClass::NotAuthenticated => {
            "Email ou senha incorretos. Verifique suas credenciais e tente novamente."
        }
        FailureClass::Network => {
            "Não foi possível conectar ao servidor. Verifique sua conexão com a internet e tente novamente."
        }
        FailureClass::Server => {
            "O servidor está temporariamente indisponível. Tente novamente em alguns instantes."
        }
        FailureClass::NotFound => {
            "Usuário não encontrado. Verifique se o email está correto ou crie uma conta."
        }
        FailureClass::Other => {
            "Não foi possível fazer login. Verifique suas credenciais e tente novamente."
        }
    }
}

/// Generic screen guidance for one classified failure.
pub fn generic_error_message(class: FailureClass) -> &'static str {
    match class {
        FailureClass::NotAuthenticated => "Sessão expirada. Faça login novamente.",
        FailureClass::Network => {
            "Não foi possível conectar ao servidor. Verifique sua conexão com a internet e tente novamente."
        }
        FailureClass::Server => {
            "O servidor está temporariamente indisponível. Tente novamente em alguns instantes."
        }
        FailureClass::NotFound | FailureClass::Other => "Ops! Algo deu errado. Tente novamente.",
    }
}

/// Steps of the registration wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationStep {
    /// Name, email, password, phone.
    #[default]
    Personal,
    /// CEP plus street address.
    Address,
    /// Read-only confirmation.
    Review,
    /// Submitted.
    Done,
}

/// Personal data collected by the first step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonalInfo {
    /// Full name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Phone number, free-form input.
    pub phone: String,
}

/// Address data collected by the second step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AddressInfo {
    /// CEP, free-form input.
    pub cep: String,
    /// Street name.
    pub street: String,
    /// House/building number.
    pub number: String,
    /// Neighborhood.
    pub neighborhood: String,
    /// Optional complement line.
    pub complement: String,
    /// City.
    pub city: String,
    /// Two-letter state code.
    pub state: String,
    /// Resolved coordinates, when geocoding succeeded.
    pub coordinates: Option<Coordinates>,
}

/// Multi-step registration form state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegistrationForm {
    step: RegistrationStep,
    /// Personal step fields.
    pub personal: PersonalInfo,
    /// Address step fields.
    pub address: AddressInfo,
}

impl RegistrationForm {
    /// Creates an empty form on the personal step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current step.
    pub fn step(&self) -> RegistrationStep {
        self.step
    }

    /// Validates the current step and advances to the next.
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] of the current step; the step
    /// does not change and no network call is made.
    pub fn advance(&mut self) -> Result<RegistrationStep, ValidationError> {
        let next = match self.step {
            RegistrationStep::Personal => {
                validate_personal(&self.personal)?;
                RegistrationStep::Address
            }
            RegistrationStep::Address => {
                validate_address(&self.address)?;
                RegistrationStep::Review
            }
            RegistrationStep::Review | RegistrationStep::Done => RegistrationStep::Done,
        };
        self.step = next;
        Ok(next)
    }

    /// Steps back without validation; data is kept.
    pub fn back(&mut self) {
        self.step = match self.step {
            RegistrationStep::Personal | RegistrationStep::Address => RegistrationStep::Personal,
            RegistrationStep::Review => RegistrationStep::Address,
            RegistrationStep::Done => RegistrationStep::Review,
        };
    }
}

/// Validates the personal step.
///
/// # Errors
/// Returns the first failing rule, in field order.
pub fn validate_personal(personal: &PersonalInfo) -> Result<(), ValidationError> {
    if personal.name.trim().chars().count() < 2 {
        return Err(ValidationError::NameTooShort);
    }
    if !is_valid_email(&personal.email) {
        return Err(ValidationError::InvalidEmail);
    }
    if personal.password.chars().count() < 6 {
        return Err(ValidationError::PasswordTooShort);
    }
    if !validate_phone(&personal.phone) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(())
}

/// Validates the address step.
///
/// # Errors
/// Returns the first failing rule, in field order.
pub fn validate_address(address: &AddressInfo) -> Result<(), ValidationError> {
    if address.cep.chars().filter(char::is_ascii_digit).count() != 8 {
        return Err(ValidationError::InvalidCep);
    }
    if address.street.trim().is_empty() {
        return Err(ValidationError::MissingStreet);
    }
    if address.number.trim().is_empty() {
        return Err(ValidationError::MissingNumber);
    }
    if address.city.trim().is_empty() {
        return Err(ValidationError::MissingCity);
    }
    Ok(())
}

/// Structural email check: local part, `@`, dotted domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Returns `true` for an eleven-digit Brazilian mobile number.
pub fn validate_phone(phone: &str) -> bool {
    phone.chars().filter(char::is_ascii_digit).count() == 11
}

/// Formats a phone number as `(00) 00000-0000`.
///
/// Inputs without exactly eleven digits are returned digit-only so the
/// formatter can run on partial input.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 11 {
        return digits;
    }
    format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..11])
}

/// Registration validation failures, with user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name shorter than two characters.
    #[error("Nome deve ter pelo menos 2 caracteres")]
    NameTooShort,
    /// Email does not look like an address.
    #[error("Email inválido")]
    InvalidEmail,
    /// Password shorter than six characters.
    #[error("Senha deve ter pelo menos 6 caracteres")]
    PasswordTooShort,
    /// Phone number is not eleven digits.
    #[error("Telefone inválido")]
    InvalidPhone,
    /// CEP is not eight digits.
    #[error("CEP inválido")]
    InvalidCep,
    /// Street is required.
    #[error("Rua é obrigatória")]
    MissingStreet,
    /// Number is required.
    #[error("Número é obrigatório")]
    MissingNumber,
    /// City is required.
    #[error("Cidade é obrigatória")]
    MissingCity,
}
