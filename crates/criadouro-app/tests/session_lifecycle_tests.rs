//! Integration tests for session persistence lifecycle.

mod common;

use criadouro_app::{AppError, authenticated_user, logout};

#[test]
fn session_lifecycle_tests_logout_clears_token_and_profile() {
    let session = common::authenticated_session();
    assert!(authenticated_user(&session).is_ok());

    logout(&session).expect("logout should work");

    assert!(!session.is_authenticated().expect("auth check should work"));
    assert!(session.user().expect("user read should work").is_none());
    assert!(matches!(
        authenticated_user(&session),
        Err(AppError::NotAuthenticated)
    ));
}

#[test]
fn session_lifecycle_tests_fetch_without_session_requires_login() {
    let transport = common::FakeTransport::replying(200, r#"{"results":[]}"#);
    let gateway = criadouro_gateway::ResultGateway::new(common::backend_config(), transport.clone());
    let session = common::empty_session();

    let error = criadouro_app::load_user_results(&gateway, &session)
        .expect_err("fetch should require a session");
    assert!(matches!(error, AppError::NotAuthenticated));
    assert_eq!(transport.request_count(), 0);
}
