//! Integration tests for wire-record canonicalization through the gateway.

mod common;

use criadouro_app::load_user_results;
use criadouro_core::{Rating, ResultStatus, SiteType};
use criadouro_gateway::ResultGateway;

#[test]
fn result_canonicalization_tests_absorbs_aliased_fields_and_timestamps() {
    let transport = common::FakeTransport::replying(
        200,
        r#"{"results":[
            {"id":1,"originalImage":"a.jpg","resultImage":"a-out.jpg",
             "type":"terreno","status":"visualized",
             "feedback":{"like":true,"comment":"boa"},
             "created_at":"2025-03-01T12:00:00Z","object_count":2},
            {"id":2,"original_image":"b.jpg",
             "type":"propriedade","status":"processing",
             "created_at":1740830400000,"campaignId":5}
        ]}"#,
    );
    let gateway = ResultGateway::new(common::backend_config(), transport);
    let session = common::authenticated_session();

    let results = load_user_results(&gateway, &session).expect("fetch should work");
    assert_eq!(results.len(), 2);

    assert_eq!(results[0].original_image, "a.jpg");
    assert_eq!(results[0].result_image.as_deref(), Some("a-out.jpg"));
    assert_eq!(results[0].feedback.rating, Rating::Liked);
    assert_eq!(results[0].detected_sites, Some(2));
    assert_eq!(results[0].created_at_ms, 1_740_830_400_000);

    assert_eq!(results[1].site_type, SiteType::Property);
    assert_eq!(results[1].status, ResultStatus::Processing);
    assert_eq!(results[1].created_at_ms, 1_740_830_400_000);
    assert_eq!(results[1].campaign_id, Some(5));
    assert!(results[1].result_image.is_none());
    assert_eq!(results[1].feedback.rating, Rating::Unrated);
}

#[test]
fn result_canonicalization_tests_malformed_timestamp_is_an_error() {
    let transport = common::FakeTransport::replying(
        200,
        r#"{"results":[{"id":1,"original_image":"a.jpg","type":"terreno",
             "status":"finished","created_at":"ontem"}]}"#,
    );
    let gateway = ResultGateway::new(common::backend_config(), transport);
    let session = common::authenticated_session();

    assert!(load_user_results(&gateway, &session).is_err());
}
