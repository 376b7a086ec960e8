mod common;

use actix_web::http::StatusCode;
use actix_web::test::{call_service, init_service, read_body_json};
use serde_json::{Value, json};

use common::{PASSWORD, TestEnv, delete, get, post, put, request};

#[actix_web::test]
async fn login_returns_a_token_that_opens_protected_routes() {
    let env = TestEnv::new();
    env.user("jane@Company.com", false).await;
    let app = init_service(env.app()).await;

    let req = request()
        .method(actix_web::http::Method::POST)
        .uri("/auth/login")
        .set_json(json!({ "email": "jane@COMPANY.com", "password": PASSWORD }))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = read_body_json(resp).await;
    let token = body["access_token"].as_str().unwrap().to_string();

    let resp = call_service(&app, get("/api/me", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me: Value = read_body_json(resp).await;
    assert_eq!(me["email"], "jane@company.com");
    assert!(me.get("password").is_none());
}

#[actix_web::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let env = TestEnv::new();
    env.user("jane@company.com", false).await;
    let app = init_service(env.app()).await;

    for (email, password) in [("jane@company.com", "nope"), ("ghost@company.com", PASSWORD)] {
        let req = request()
            .method(actix_web::http::Method::POST)
            .uri("/auth/login")
            .set_json(json!({ "email": email, "password": password }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["message"], "Invalid credentials");
    }
}

#[actix_web::test]
async fn blank_credentials_are_a_bad_request() {
    let env = TestEnv::new();
    let app = init_service(env.app()).await;

    let req = request()
        .method(actix_web::http::Method::POST)
        .uri("/auth/login")
        .set_json(json!({ "email": "  ", "password": "" }))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn protected_routes_reject_missing_and_forged_tokens() {
    let env = TestEnv::new();
    let app = init_service(env.app()).await;

    let req = request().uri("/api/me").to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = call_service(&app, get("/api/me", "not-a-jwt").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid or expired token");
}

#[actix_web::test]
async fn deleted_users_token_is_rejected() {
    let env = TestEnv::new();
    let root = env.superuser("root@company.com").await;
    let victim = env.user("victim@company.com", false).await;
    let app = init_service(env.app()).await;
    let stale = env.token(&victim);

    let req = delete(&format!("/api/users/{}", victim.id), &env.token(&root)).to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);

    let req = post("/api/forms", &stale)
        .set_json(json!({ "title": "ghost" }))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = get("/api/forms", &env.token(&root)).to_request();
    let page: Value = read_body_json(call_service(&app, req).await).await;
    assert_eq!(page["total"], 0);
}

#[actix_web::test]
async fn token_rights_follow_the_stored_account() {
    let env = TestEnv::new();
    let root = env.superuser("root@company.com").await;
    let staff = env.user("staff@company.com", true).await;
    let member = env.user("member@company.com", false).await;
    let app = init_service(env.app()).await;
    let root_token = env.token(&root);
    let staff_token = env.token(&staff);
    let member_token = env.token(&member);

    // demoted: the old token no longer carries staff rights
    let req = put(&format!("/api/users/{}", staff.id), &root_token)
        .set_json(json!({ "is_staff": false }))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);
    let resp = call_service(&app, get("/api/users", &staff_token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = put(&format!("/api/users/{}", member.id), &root_token)
        .set_json(json!({ "is_active": false }))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);
    let resp = call_service(&app, get("/api/me", &member_token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
