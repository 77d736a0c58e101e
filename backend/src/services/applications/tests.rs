use super::configure_routes;
use crate::state::AppState;
use crate::store::ApplicationStore;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use common::codec::Codec;
use common::requests::CreateApplicationResponse;
use serde_json::{json, Value};
use tempfile::TempDir;

fn state() -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let store = ApplicationStore::open(dir.path().join("permits.sqlite")).unwrap();
    let state = AppState {
        store,
        codec: Codec::default(),
    };
    (dir, state)
}

#[actix_web::test]
async fn draft_then_reopen() {
    let (_dir, state) = state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(configure_routes()),
    )
    .await;

    let req = test::TestRequest::post().uri("/api/applications").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: CreateApplicationResponse = test::read_body_json(resp).await;

    let form = json!({
        "purpose": "mining",
        "miningType": "Open Pit",
        "miningArea": 12.5,
        "province": "Atlantis",
        "latitude": "-1.95",
        "longitude": "30.06",
        "projectTitle": "Gatumba tin"
    });
    let req = test::TestRequest::post()
        .uri(&format!("/api/applications/{}/draft", created.id))
        .set_json(&form)
        .to_request();
    let saved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(saved["record"]["status"], "draft");
    assert_eq!(saved["record"]["sla_status"], "pending");
    assert_eq!(
        saved["record"]["mining_operations_type"],
        "Type: Open Pit | Area: 12.5 hectares"
    );
    assert_eq!(saved["record"]["province"], "Kigali");
    assert_eq!(
        saved["record"]["coordinates"],
        json!({"type": "Point", "coordinates": [30.06, -1.95]})
    );
    assert_eq!(saved["warnings"][0]["kind"], "province_fallback");

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/applications/{}?applicantName=Eric%20Niyonzima&email=eric%40example.rw",
            created.id
        ))
        .to_request();
    let reopened: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(reopened["miningType"], "Open Pit");
    assert_eq!(reopened["miningArea"], 12.5);
    assert_eq!(reopened["miningMethod"], Value::Null);
    assert_eq!(reopened["purpose"], "mining");
    assert_eq!(reopened["province"], "kigali");
    assert_eq!(reopened["latitude"], "-1.95");
    assert_eq!(reopened["applicantName"], "Eric Niyonzima");
    assert_eq!(reopened["email"], "eric@example.rw");
}

#[actix_web::test]
async fn submit_sets_status() {
    let (_dir, state) = state();
    let id = state.store.create_application().unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(configure_routes()),
    )
    .await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/applications/{}/submit", id))
        .set_json(json!({"projectTitle": "Akagera pumping"}))
        .to_request();
    let saved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(saved["record"]["status"], "submitted");
    assert_eq!(saved["record"]["sla_status"], "on_track");
    assert_eq!(saved["record"]["project_title"], "Akagera pumping");
    assert_eq!(saved["warnings"], json!([]));
}

#[actix_web::test]
async fn unknown_application_is_not_found() {
    let (_dir, state) = state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(configure_routes()),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/applications/does-not-exist")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/applications/does-not-exist/draft")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
