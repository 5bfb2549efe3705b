//! Integration tests for friendly error translation.

use criadouro_app::{AppError, screen_message};
use criadouro_gateway::{FailureClass, GatewayError, classify_gateway_error};
use criadouro_ui::{generic_error_message, login_error_message};

#[test]
fn friendly_error_tests_classification_drives_guidance() {
    let timeout = GatewayError::Network("operation timed out".to_string());
    assert_eq!(classify_gateway_error(&timeout), FailureClass::Network);
    assert_eq!(
        login_error_message(classify_gateway_error(&timeout)),
        "Não foi possível conectar ao servidor. Verifique sua conexão com a internet e tente novamente."
    );

    let broken = GatewayError::Status {
        status: 500,
        body: String::new(),
    };
    assert_eq!(
        generic_error_message(classify_gateway_error(&broken)),
        "O servidor está temporariamente indisponível. Tente novamente em alguns instantes."
    );

    let missing = GatewayError::Status {
        status: 404,
        body: String::new(),
    };
    assert_eq!(
        login_error_message(classify_gateway_error(&missing)),
        "Usuário não encontrado. Verifique se o email está correto ou crie uma conta."
    );
}

#[test]
fn friendly_error_tests_screen_message_covers_feedback_failure() {
    let error = AppError::Feedback(criadouro_feedback::FeedbackError::Submission(
        "backend returned status 502".to_string(),
    ));
    assert_eq!(
        screen_message(&error),
        "Não foi possível enviar o feedback. Tente novamente."
    );
}

#[test]
fn friendly_error_tests_validation_text_passes_through() {
    let error = AppError::Validation("Por favor, preencha todos os campos".to_string());
    assert_eq!(screen_message(&error), "Por favor, preencha todos os campos");
}
