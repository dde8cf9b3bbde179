//! The analysis workflow over HTTP.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use urbanplan_integration_tests::{TestContext, json_body};

async fn analyst() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.demo("analyst").await;
    ctx
}

async fn add(ctx: &TestContext, category: &str) -> Value {
    let response = ctx
        .post_json("/api/analysis/documents", &json!({ "category": category }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await
}

#[tokio::test]
async fn test_reference_scenario() {
    let ctx = analyst().await;

    let session = json_body(
        ctx.put_json(
            "/api/analysis/project",
            &json!({ "protocol": "2024-00150", "address": "Rua das Flores, 123" }),
        )
        .await,
    )
    .await;
    assert_eq!(session["stage"], "collecting");

    add(&ctx, "site-plan").await;
    add(&ctx, "measurement-sheet").await;

    let response = ctx.post("/api/analysis/submit").await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = json_body(response).await;
    assert_eq!(body["session"]["stage"], "processing");
    let generation = body["generation"].as_u64().unwrap();

    // Reentrancy guard
    let response = ctx.post("/api/analysis/submit").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let session = json_body(ctx.get("/api/analysis/settled").await).await;
    assert_eq!(session["stage"], "reviewing");
    assert_eq!(session["result"]["score"], 87);
    assert_eq!(session["generation"].as_u64().unwrap(), generation);
    assert!(
        session["documents"]
            .as_array()
            .unwrap()
            .iter()
            .all(|d| d["status"] == "analyzed")
    );

    let session = json_body(ctx.post("/api/analysis/finish").await).await;
    assert_eq!(session["stage"], "done");

    let response = ctx.post("/api/analysis/back").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_submission_guards() {
    let ctx = analyst().await;

    let response = ctx.post("/api/analysis/submit").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["field"], "protocol");

    ctx.put_json(
        "/api/analysis/project",
        &json!({ "protocol": "2024-00150", "address": "Rua das Flores, 123" }),
    )
    .await;
    add(&ctx, "site-plan").await;

    let response = ctx.post("/api/analysis/submit").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["field"], "documents");

    let session = json_body(ctx.get("/api/analysis").await).await;
    assert_eq!(session["stage"], "collecting");
}

#[tokio::test]
async fn test_go_back_then_restart() {
    let ctx = analyst().await;
    ctx.put_json(
        "/api/analysis/project",
        &json!({ "protocol": "2024-00150", "address": "Rua das Flores, 123" }),
    )
    .await;
    add(&ctx, "site-plan").await;
    add(&ctx, "supporting-document").await;
    ctx.post("/api/analysis/submit").await;
    ctx.get("/api/analysis/settled").await;

    let session = json_body(ctx.post("/api/analysis/back").await).await;
    assert_eq!(session["stage"], "collecting");
    assert!(session["result"].is_null());
    assert_eq!(session["documents"].as_array().unwrap().len(), 2);

    let session = json_body(ctx.post("/api/analysis/restart").await).await;
    assert_eq!(session["stage"], "collecting");
    assert_eq!(session["protocol"], "");
    assert!(session["documents"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_cancel_discards_outstanding_analysis() {
    let ctx = analyst().await;
    ctx.put_json(
        "/api/analysis/project",
        &json!({ "protocol": "2024-00150", "address": "Rua das Flores, 123" }),
    )
    .await;
    add(&ctx, "site-plan").await;
    add(&ctx, "measurement-sheet").await;
    ctx.post("/api/analysis/submit").await;

    let session = json_body(ctx.post("/api/analysis/cancel").await).await;
    assert_eq!(session["stage"], "collecting");

    tokio::time::sleep(std::time::Duration::from_millis(150)).await;
    let session = json_body(ctx.get("/api/analysis").await).await;
    assert_eq!(session["stage"], "collecting");
    assert!(session["result"].is_null());

    let response = ctx.post("/api/analysis/cancel").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_upload_failure_and_retry() {
    let ctx = analyst().await;

    let response = ctx
        .client
        .post(ctx.url("/api/analysis/uploads?category=site-plan&name=planta.pdf"))
        .body(Vec::<u8>::new())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let session = json_body(ctx.get("/api/analysis").await).await;
    let failed = &session["documents"][0];
    assert_eq!(failed["status"], "error");
    let id = failed["id"].as_str().unwrap().to_string();

    let response = ctx
        .client
        .post(ctx.url(&format!("/api/analysis/documents/{id}/retry")))
        .body(b"%PDF-1.7 planta".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    assert_eq!(doc["status"], "uploaded");
    assert_eq!(doc["storage_key"], format!("site-plan/{id}"));

    // Only errored records can be retried
    let response = ctx
        .client
        .post(ctx.url(&format!("/api/analysis/documents/{id}/retry")))
        .body(b"again".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_remove_document() {
    let ctx = analyst().await;
    let doc = add(&ctx, "site-plan").await;
    let id = doc["id"].as_str().unwrap();

    let response = ctx.delete(&format!("/api/analysis/documents/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let session = json_body(ctx.get("/api/analysis").await).await;
    assert!(session["documents"].as_array().unwrap().is_empty());

    let response = ctx.delete(&format!("/api/analysis/documents/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_workflow_belongs_to_session() {
    let ctx = analyst().await;
    ctx.put_json(
        "/api/analysis/project",
        &json!({ "protocol": "2024-00150", "address": "Rua das Flores, 123" }),
    )
    .await;

    let other = ctx.second_client();
    other.demo("analyst").await;
    let session = json_body(other.get("/api/analysis").await).await;
    assert_eq!(session["protocol"], "");
}

async fn start_project(ctx: &TestContext) {
    ctx.put_json(
        "/api/analysis/project",
        &json!({ "protocol": "2024-00150", "address": "Rua das Flores, 123" }),
    )
    .await;
    add(ctx, "site-plan").await;
}

async fn assert_fresh(ctx: &TestContext) {
    let session = json_body(ctx.get("/api/analysis").await).await;
    assert_eq!(session["stage"], "collecting");
    assert_eq!(session["protocol"], "");
    assert!(session["documents"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_new_sign_in_starts_a_fresh_workflow() {
    let ctx = TestContext::new().await;
    ctx.login("fiscal.a@florianopolis.gov", "senha").await;
    start_project(&ctx).await;
    let session = json_body(ctx.get("/api/analysis").await).await;
    assert_eq!(session["protocol"], "2024-00150");

    ctx.login("fiscal.b@florianopolis.gov", "senha").await;
    assert_fresh(&ctx).await;
}

#[tokio::test]
async fn test_demo_switch_starts_a_fresh_workflow() {
    let ctx = analyst().await;
    start_project(&ctx).await;

    ctx.demo("administrator").await;
    ctx.demo("analyst").await;
    assert_fresh(&ctx).await;
}

#[tokio::test]
async fn test_logout_drops_the_workflow() {
    let ctx = analyst().await;
    start_project(&ctx).await;

    ctx.post("/auth/logout").await;
    ctx.demo("analyst").await;
    assert_fresh(&ctx).await;
}
