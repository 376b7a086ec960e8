mod common;

use actix_web::http::StatusCode;
use actix_web::test::{call_service, init_service, read_body_json};
use serde_json::{Value, json};

use common::{TestEnv, delete, get, post, put};

#[actix_web::test]
async fn division_tree_rejects_cycles_and_reports_ancestors() {
    let env = TestEnv::new();
    let admin = env.user("admin@company.com", true).await;
    let app = init_service(env.app()).await;
    let token = env.token(&admin);

    let mut ids = Vec::new();
    let mut parent: Option<u64> = None;
    for name in ["Company", "Engineering", "Platform"] {
        let req = post("/api/divisions", &token)
            .set_json(json!({ "name": name, "parent_id": parent }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let division: Value = read_body_json(resp).await;
        let id = division["id"].as_u64().unwrap();
        ids.push(id);
        parent = Some(id);
    }
    let (root, leaf) = (ids[0], ids[2]);

    let req = put(&format!("/api/divisions/{root}"), &token)
        .set_json(json!({ "parent_id": leaf }))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = put(&format!("/api/divisions/{root}"), &token)
        .set_json(json!({ "parent_id": root }))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let resp = call_service(
        &app,
        get(&format!("/api/divisions/{leaf}/ancestors"), &token).to_request(),
    )
    .await;
    let chain: Value = read_body_json(resp).await;
    let names: Vec<&str> = chain
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Engineering", "Company"]);
}

#[actix_web::test]
async fn explicit_null_clears_the_parent() {
    let env = TestEnv::new();
    let admin = env.user("admin@company.com", true).await;
    let app = init_service(env.app()).await;
    let token = env.token(&admin);

    let req = post("/api/divisions", &token)
        .set_json(json!({ "name": "Company" }))
        .to_request();
    let root: Value = read_body_json(call_service(&app, req).await).await;
    let req = post("/api/divisions", &token)
        .set_json(json!({ "name": "Sales", "parent_id": root["id"], "manager_id": admin.id }))
        .to_request();
    let child: Value = read_body_json(call_service(&app, req).await).await;
    let uri = format!("/api/divisions/{}", child["id"]);

    // renaming leaves the references alone
    let req = put(&uri, &token).set_json(json!({ "name": "Sales EMEA" })).to_request();
    let updated: Value = read_body_json(call_service(&app, req).await).await;
    assert_eq!(updated["parent_id"], root["id"]);
    assert_eq!(updated["manager_id"].as_u64(), Some(admin.id));

    let req = put(&uri, &token).set_json(json!({ "parent_id": null })).to_request();
    let updated: Value = read_body_json(call_service(&app, req).await).await;
    assert!(updated["parent_id"].is_null());
    assert_eq!(updated["name"], "Sales EMEA");
}

#[actix_web::test]
async fn directory_writes_need_staff() {
    let env = TestEnv::new();
    let member = env.user("member@company.com", false).await;
    let admin = env.user("admin@company.com", true).await;
    let app = init_service(env.app()).await;

    let req = post("/api/divisions", &env.token(&member))
        .set_json(json!({ "name": "Shadow IT" }))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = post("/api/skills", &env.token(&member))
        .set_json(json!({ "name": "Python" }))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    // reads are open to everyone signed in
    let resp = call_service(&app, get("/api/divisions", &env.token(&member)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = post("/api/divisions", &env.token(&admin))
        .set_json(json!({ "name": "Ops", "manager_id": 4242 }))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn positions_and_skills_are_separate_tables() {
    let env = TestEnv::new();
    let admin = env.user("admin@company.com", true).await;
    let app = init_service(env.app()).await;
    let token = env.token(&admin);

    for (uri, name) in [
        ("/api/positions", "Developer"),
        ("/api/positions", "Analyst"),
        ("/api/skills", "Rust"),
    ] {
        let req = post(uri, &token).set_json(json!({ "name": name })).to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = post("/api/skills", &token)
        .set_json(json!({ "name": "x".repeat(51) }))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let resp = call_service(&app, get("/api/positions", &token).to_request()).await;
    let positions: Value = read_body_json(resp).await;
    assert_eq!(positions[0]["name"], "Analyst");
    assert_eq!(positions[1]["name"], "Developer");

    let resp = call_service(&app, get("/api/skills", &token).to_request()).await;
    let skills: Value = read_body_json(resp).await;
    assert_eq!(skills.as_array().unwrap().len(), 1);

    let uri = format!("/api/skills/{}", skills[0]["id"]);
    let resp = call_service(&app, delete(&uri, &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = call_service(&app, delete(&uri, &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
