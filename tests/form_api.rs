mod common;

use actix_web::http::StatusCode;
use actix_web::test::{call_service, init_service, read_body_json};
use serde_json::{Value, json};

use common::{TestEnv, delete, get, post, put};
use drs::model::division::NewDivision;
use drs::service::directory::create_division;

#[actix_web::test]
async fn manager_form_is_approved_by_recipient() {
    let env = TestEnv::new();
    let manager = env.user("a@company.com", false).await;
    let recipient = env.user("b@company.com", false).await;
    let division = create_division(
        env.store.as_ref(),
        NewDivision {
            name: "Education Team".into(),
            manager_id: Some(manager.id),
            parent_id: None,
        },
    )
    .await
    .unwrap();
    let app = init_service(env.app()).await;
    let sender_token = env.token(&manager);
    let recipient_token = env.token(&recipient);

    let req = post("/api/forms", &sender_token)
        .set_json(json!({
            "title": "Leave early on Friday",
            "recipient_id": recipient.id,
            "division_id": division.id,
            "form_type": "le",
            "leave_from": "2026-03-06",
            "leave_to": "2026-03-06"
        }))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let form: Value = read_body_json(resp).await;
    assert_eq!(form["status"], "p");
    assert_eq!(form["form_type"], "le");
    let form_id = form["id"].as_u64().unwrap();

    let req = put(&format!("/api/forms/{form_id}/status"), &recipient_token)
        .set_json(json!({ "status": "a" }))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let form: Value = read_body_json(resp).await;
    assert_eq!(form["status"], "a");
    assert_eq!(form["form_type"], "le");

    // approved is final
    let req = put(&format!("/api/forms/{form_id}/status"), &recipient_token)
        .set_json(json!({ "status": "rejected" }))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // the sender hears about the decision
    let resp = call_service(&app, get("/api/notifications", &sender_token).to_request()).await;
    let feed: Value = read_body_json(resp).await;
    let feed = feed.as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["notification_type"], "approved");
    assert_eq!(feed[0]["form_id"].as_u64(), Some(form_id));
}

#[actix_web::test]
async fn invalid_payloads_are_rejected() {
    let env = TestEnv::new();
    let sender = env.user("a@company.com", false).await;
    let app = init_service(env.app()).await;
    let token = env.token(&sender);

    let cases = [
        json!({ "title": "" }),
        json!({ "title": "x", "form_type": "vacation" }),
        json!({ "title": "x", "leave_from": "2026-03-07", "leave_to": "2026-03-06" }),
    ];
    for body in cases {
        let req = post("/api/forms", &token).set_json(body).to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    let req = post("/api/forms", &token)
        .set_json(json!({ "title": "x", "recipient_id": 999 }))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn outsiders_cannot_read_or_decide() {
    let env = TestEnv::new();
    let sender = env.user("a@company.com", false).await;
    let recipient = env.user("b@company.com", false).await;
    let outsider = env.user("c@company.com", false).await;
    let app = init_service(env.app()).await;

    let req = post("/api/forms", &env.token(&sender))
        .set_json(json!({ "title": "In late", "recipient_id": recipient.id, "form_type": "il" }))
        .to_request();
    let form: Value = read_body_json(call_service(&app, req).await).await;
    let form_id = form["id"].as_u64().unwrap();
    let outsider_token = env.token(&outsider);

    let resp = call_service(
        &app,
        get(&format!("/api/forms/{form_id}"), &outsider_token).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = put(&format!("/api/forms/{form_id}/status"), &outsider_token)
        .set_json(json!({ "status": "a" }))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    // the sender may cancel but not approve
    let sender_token = env.token(&sender);
    let req = put(&format!("/api/forms/{form_id}/status"), &sender_token)
        .set_json(json!({ "status": "a" }))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = put(&format!("/api/forms/{form_id}/status"), &sender_token)
        .set_json(json!({ "status": "c" }))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let form: Value = read_body_json(resp).await;
    assert_eq!(form["status"], "c");
}

#[actix_web::test]
async fn non_staff_listing_is_scoped_to_own_forms() {
    let env = TestEnv::new();
    let alice = env.user("alice@company.com", false).await;
    let bob = env.user("bob@company.com", false).await;
    let admin = env.user("admin@company.com", true).await;
    let app = init_service(env.app()).await;

    for (user, title) in [(&alice, "first"), (&alice, "second"), (&bob, "third")] {
        let req = post("/api/forms", &env.token(user))
            .set_json(json!({ "title": title }))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let resp = call_service(&app, get("/api/forms", &env.token(&alice)).to_request()).await;
    let page: Value = read_body_json(resp).await;
    assert_eq!(page["total"], 2);
    // newest first
    assert_eq!(page["data"][0]["title"], "second");

    let uri = format!("/api/forms?sender_id={}", bob.id);
    let resp = call_service(&app, get(&uri, &env.token(&alice)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = call_service(
        &app,
        get("/api/forms?per_page=2&page=2", &env.token(&admin)).to_request(),
    )
    .await;
    let page: Value = read_body_json(resp).await;
    assert_eq!(page["total"], 3);
    assert_eq!(page["data"].as_array().unwrap().len(), 1);
    assert_eq!(page["data"][0]["title"], "first");
}

#[actix_web::test]
async fn only_staff_delete_forms() {
    let env = TestEnv::new();
    let sender = env.user("a@company.com", false).await;
    let admin = env.user("admin@company.com", true).await;
    let app = init_service(env.app()).await;

    let req = post("/api/forms", &env.token(&sender))
        .set_json(json!({ "title": "Report" }))
        .to_request();
    let form: Value = read_body_json(call_service(&app, req).await).await;
    let uri = format!("/api/forms/{}", form["id"]);

    let resp = call_service(&app, delete(&uri, &env.token(&sender)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = call_service(&app, delete(&uri, &env.token(&admin)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = call_service(&app, get(&uri, &env.token(&admin)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
