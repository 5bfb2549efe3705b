//! Integration tests for duplicate-refresh suppression.

use criadouro_ui::Resource;

#[test]
fn refresh_guard_tests_ignores_refresh_while_fetch_in_flight() {
    let mut resource: Resource<Vec<u64>> = Resource::new();
    assert!(resource.begin_load());
    assert!(!resource.begin_refresh());
    assert!(!resource.begin_load());

    resource.resolve(Ok(vec![1, 2]));
    assert!(resource.begin_refresh());
    assert!(!resource.begin_refresh());
}

#[test]
fn refresh_guard_tests_failure_clears_loading_flags() {
    let mut resource: Resource<u64> = Resource::new();
    resource.begin_load();
    resource.resolve(Err("Ops! Algo deu errado. Tente novamente.".to_string()));

    assert!(!resource.is_refreshing());
    assert_eq!(
        resource.error(),
        Some("Ops! Algo deu errado. Tente novamente.")
    );
    assert!(resource.begin_refresh());
}
