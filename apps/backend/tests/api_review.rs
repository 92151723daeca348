//! Review scheduling API tests.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use common::TestContext;

fn due_day(body: &Value) -> chrono::NaiveDate {
    let due: DateTime<Utc> = body["state"]["due_date"]
        .as_str()
        .expect("due_date present")
        .parse()
        .expect("due_date parses");
    due.date_naive()
}

#[tokio::test]
async fn new_card_is_due_immediately() {
    let ctx = TestContext::new();
    ctx.seed_card("a", "mod1");
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.get("/api/review/due").await;
    response.assert_status_ok();
    let due: Value = response.json();
    assert_eq!(due.as_array().unwrap().len(), 1);
    assert_eq!(due[0]["id"], "a");
}

#[tokio::test]
async fn complete_review_advances_step_and_due_date() {
    let ctx = TestContext::new();
    ctx.seed_card("a", "mod1");
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.post("/api/review/a/complete").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["card_id"], "a");
    assert_eq!(body["state"]["step"], 1);
    // First plan gap is 3 days.
    assert_eq!(due_day(&body), (Utc::now() + Duration::days(3)).date_naive());
    assert!(body["state"]["last_reviewed"].is_string());
}

#[tokio::test]
async fn step_saturates_at_plan_length() {
    let ctx = TestContext::new();
    ctx.seed_card("a", "mod1");
    let server = TestServer::new(ctx.router()).unwrap();

    let mut body = Value::Null;
    for _ in 0..5 {
        let response = server.post("/api/review/a/complete").await;
        response.assert_status_ok();
        body = response.json();
    }

    assert_eq!(body["state"]["step"], 3);
    // Past the plan the final 12-day gap repeats.
    assert_eq!(
        due_day(&body),
        (Utc::now() + Duration::days(12)).date_naive()
    );
}

#[tokio::test]
async fn reviewed_card_leaves_due_list() {
    let ctx = TestContext::new();
    ctx.seed_card("a", "mod1");
    ctx.seed_card("b", "mod1");
    let server = TestServer::new(ctx.router()).unwrap();

    server.post("/api/review/a/complete").await.assert_status_ok();

    let due: Value = server.get("/api/review/due").await.json();
    let ids: Vec<&str> = due
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["b"]);
}

#[tokio::test]
async fn due_list_respects_module_filter() {
    let ctx = TestContext::new();
    ctx.seed_card("a", "mod1");
    ctx.seed_card("b", "mod2");
    let server = TestServer::new(ctx.router()).unwrap();

    let due: Value = server.get("/api/review/due?module=mod2").await.json();
    assert_eq!(due.as_array().unwrap().len(), 1);
    assert_eq!(due[0]["id"], "b");
}

#[tokio::test]
async fn state_is_written_through() {
    let ctx = TestContext::new();
    ctx.seed_card("a", "mod1");
    let server = TestServer::new(ctx.router()).unwrap();

    server.post("/api/review/a/complete").await.assert_status_ok();

    let response = server.get("/api/review/a").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["state"]["step"], 1);
    assert!(body["state"]["due_date"].is_string());
}

#[tokio::test]
async fn reset_clears_progress_and_is_idempotent() {
    let ctx = TestContext::new();
    ctx.seed_card("a", "mod1");
    let server = TestServer::new(ctx.router()).unwrap();

    server.post("/api/review/a/complete").await.assert_status_ok();

    let first: Value = server.post("/api/review/a/reset").await.json();
    let second: Value = server.post("/api/review/a/reset").await.json();
    assert_eq!(first["state"], second["state"]);
    assert_eq!(first["state"]["step"], 0);
    assert!(first["state"]["due_date"].is_null());

    // Back on the due list.
    let due: Value = server.get("/api/review/due").await.json();
    assert_eq!(due.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn never_reviewed_card_reports_fresh_state() {
    let ctx = TestContext::new();
    ctx.seed_card("a", "mod1");
    let server = TestServer::new(ctx.router()).unwrap();

    let body: Value = server.get("/api/review/a").await.json();
    assert_eq!(body["state"]["step"], 0);
    assert!(body["state"]["due_date"].is_null());
    assert!(body["state"]["last_reviewed"].is_null());
}

#[tokio::test]
async fn unknown_card_is_not_found() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();

    server.get("/api/review/ghost").await.assert_status(StatusCode::NOT_FOUND);
    server
        .post("/api/review/ghost/complete")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .post("/api/review/ghost/reset")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
