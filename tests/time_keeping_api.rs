mod common;

use actix_web::http::StatusCode;
use actix_web::test::{call_service, init_service, read_body_json};
use serde_json::Value;

use common::{TestEnv, get, post, put};

#[actix_web::test]
async fn check_in_once_then_check_out() {
    let env = TestEnv::new();
    let user = env.user("worker@company.com", false).await;
    let app = init_service(env.app()).await;
    let token = env.token(&user);

    let resp = call_service(&app, put("/api/timekeeping/check-out", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = call_service(&app, post("/api/timekeeping/check-in", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let record: Value = read_body_json(resp).await;
    assert!(record["checkout_time"].is_null());

    let resp = call_service(&app, post("/api/timekeeping/check-in", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["message"], "Already checked in today");

    let resp = call_service(&app, put("/api/timekeeping/check-out", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let record: Value = read_body_json(resp).await;
    assert!(!record["checkout_time"].is_null());

    let resp = call_service(&app, get("/api/timekeeping", &token).to_request()).await;
    let ledger: Value = read_body_json(resp).await;
    assert_eq!(ledger.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn other_ledgers_are_staff_only() {
    let env = TestEnv::new();
    let worker = env.user("worker@company.com", false).await;
    let peer = env.user("peer@company.com", false).await;
    let admin = env.user("admin@company.com", true).await;
    let app = init_service(env.app()).await;

    let resp = call_service(
        &app,
        post("/api/timekeeping/check-in", &env.token(&worker)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let uri = format!("/api/timekeeping?user_id={}", worker.id);
    let resp = call_service(&app, get(&uri, &env.token(&peer)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = call_service(&app, get(&uri, &env.token(&admin)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let ledger: Value = read_body_json(resp).await;
    assert_eq!(ledger[0]["user_id"].as_u64(), Some(worker.id));
}

#[actix_web::test]
async fn reversed_range_is_rejected() {
    let env = TestEnv::new();
    let user = env.user("worker@company.com", false).await;
    let app = init_service(env.app()).await;

    let uri = "/api/timekeeping?from=2026-03-10&to=2026-03-01";
    let resp = call_service(&app, get(uri, &env.token(&user)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
