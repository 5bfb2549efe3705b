//! Integration tests for campaign overview loading.

mod common;

use criadouro_app::load_campaign_summaries;
use criadouro_gateway::CampaignGateway;

#[test]
fn campaign_overview_tests_projects_summaries_with_pending_counts() {
    let transport = common::FakeTransport::replying(
        200,
        r#"{"campaigns":[
            {"id":1,"title":"Campanha Verão","description":"focos no verão",
             "city":"São Paulo","campaign_infos":[],"instruction_infos":[],
             "created_at":"2025-01-01T00:00:00Z","finish_at":"2025-12-31T23:59:59Z",
             "results":[
               {"id":1,"original_image":"a.jpg","type":"terreno",
                "status":"visualized","created_at":1},
               {"id":2,"original_image":"b.jpg","type":"terreno",
                "status":"finished","created_at":2}
             ]},
            {"id":2,"title":"Campanha Encerrada","description":"antiga",
             "city":"Santos","campaign_infos":[],"instruction_infos":[],
             "created_at":"2024-01-01T00:00:00Z","finish_at":"2024-06-30T00:00:00Z",
             "results":[]}
        ]}"#,
    );
    let gateway = CampaignGateway::new(common::backend_config(), transport);
    let session = common::authenticated_session();

    // Mid-2025 evaluation instant: first campaign open, second closed.
    let summaries = load_campaign_summaries(&gateway, &session, 1_750_000_000_000)
        .expect("overview should load");

    assert_eq!(summaries.len(), 2);
    assert!(summaries[0].is_active);
    assert_eq!(summaries[0].results_not_displayed, 1);
    assert!(!summaries[1].is_active);
    assert_eq!(summaries[1].results_not_displayed, 0);
}

#[test]
fn campaign_overview_tests_fetch_targets_user_endpoint() {
    let transport = common::FakeTransport::replying(200, r#"{"campaigns":[]}"#);
    let gateway = CampaignGateway::new(common::backend_config(), transport.clone());
    let session = common::authenticated_session();

    load_campaign_summaries(&gateway, &session, 0).expect("overview should load");

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url.path(),
        "/campaigns/getCampaignByUser/10"
    );
}
