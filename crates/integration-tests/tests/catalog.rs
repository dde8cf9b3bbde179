//! Dashboard, projects and calendar endpoints.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use reqwest::StatusCode;

use urbanplan_integration_tests::{TestContext, json_body};

#[tokio::test]
async fn test_dashboard_per_role() {
    let ctx = TestContext::new().await;

    ctx.demo("analyst").await;
    let body = json_body(ctx.get("/api/dashboard").await).await;
    assert_eq!(body["summary"]["kind"], "analyst_workbench");
    assert_eq!(body["summary"]["pending"], 1);
    assert_eq!(body["summary"]["in_review"], 1);
    assert_eq!(body["view"]["quick_actions"][0]["label"], "Nova Análise");

    ctx.demo("administrator").await;
    let body = json_body(ctx.get("/api/dashboard").await).await;
    assert_eq!(body["summary"]["kind"], "team_overview");
    assert_eq!(body["summary"]["analysts"].as_array().unwrap().len(), 4);

    ctx.demo("platform_operator").await;
    let body = json_body(ctx.get("/api/dashboard").await).await;
    assert_eq!(body["summary"]["kind"], "municipality_overview");
    assert_eq!(body["summary"]["active"], 3);
}

#[tokio::test]
async fn test_project_search_and_filter() {
    let ctx = TestContext::new().await;
    ctx.demo("analyst").await;

    let body = json_body(ctx.get("/api/projects").await).await;
    assert_eq!(body["projects"].as_array().unwrap().len(), 6);
    assert_eq!(body["counts"]["all"], 6);

    let body = json_body(ctx.get("/api/projects?search=beira").await).await;
    let projects = body["projects"].as_array().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["protocol"], "2024-00144");
    // Counts ignore the search
    assert_eq!(body["counts"]["all"], 6);

    let body = json_body(ctx.get("/api/projects?status=approved").await).await;
    assert_eq!(body["projects"].as_array().unwrap().len(), 2);

    let body = json_body(ctx.get("/api/projects?status=all&search=00141").await).await;
    assert_eq!(body["projects"][0]["status"], "needs_changes");

    let response = ctx.get("/api/projects?status=archived").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_calendar_month_and_day() {
    let ctx = TestContext::new().await;
    ctx.demo("analyst").await;

    let body = json_body(ctx.get("/api/calendar?year=2024&month=2").await).await;
    assert_eq!(body["days_in_month"], 29);
    assert_eq!(body["month_name"], "Fevereiro");
    assert_eq!(body["first_weekday"], 4);
    assert_eq!(body["next"]["month"], 3);

    let today = Utc::now().date_naive();
    let body = json_body(ctx.get(&format!("/api/calendar/{today}")).await).await;
    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Revisar projeto #2024-00145");

    let response = ctx.get("/api/calendar/31-12-2024").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx.get("/api/calendar?year=2024&month=13").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
