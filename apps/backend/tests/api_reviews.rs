//! Review scheduling API tests.
//!
//! Most tests require a running PostgreSQL database.
//! Set DATABASE_URL environment variable before running.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Duration;

use common::fixtures;
use common::TestContext;

/// Test repeated good reviews follow the 1, 6, 15 day ladder.
#[tokio::test]
#[ignore = "requires database"]
async fn test_submit_review_ladder() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let user_id = fixtures::unique_user_id("ladder");
    let path = fixtures::reviews_path(&user_id);

    let mut intervals = Vec::new();
    for _ in 0..3 {
        let response = server
            .post(&path)
            .json(&fixtures::submit_review_request("ch1-q1", 2))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        intervals.push(body["state"]["interval"].as_u64().unwrap());
        assert_eq!(body["state"]["ease_factor"], 2.5);

        ctx.clock.advance(Duration::days(1));
    }

    assert_eq!(intervals, vec![1, 6, 15]);

    // Cleanup
    ctx.cleanup_user(&user_id).await;
}

/// Test the first review has no previous state and later ones do.
#[tokio::test]
#[ignore = "requires database"]
async fn test_submit_review_returns_previous() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let user_id = fixtures::unique_user_id("previous");
    let path = fixtures::reviews_path(&user_id);

    let first = server
        .post(&path)
        .json(&fixtures::submit_review_request("ch2-q1", 3))
        .await;
    first.assert_status_ok();
    let body: serde_json::Value = first.json();
    assert!(body.get("previous").is_none());

    let second = server
        .post(&path)
        .json(&fixtures::submit_review_request("ch2-q1", 0))
        .await;
    second.assert_status_ok();
    let body: serde_json::Value = second.json();
    assert_eq!(body["previous"]["repetitions"], 1);
    assert_eq!(body["state"]["repetitions"], 0);
    assert_eq!(body["state"]["interval"], 1);

    // Cleanup
    ctx.cleanup_user(&user_id).await;
}

/// Test a quality outside 0..=3 is rejected before touching storage.
#[tokio::test]
async fn test_submit_review_invalid_quality() {
    let ctx = TestContext::without_database();
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post(&fixtures::reviews_path("nobody"))
        .json(&fixtures::submit_review_request("ch1-q1", 7))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "invalid_argument");
}

/// Test a blank item id is rejected.
#[tokio::test]
async fn test_submit_review_empty_item_id() {
    let ctx = TestContext::without_database();
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post(&fixtures::reviews_path("nobody"))
        .json(&fixtures::submit_review_request("   ", 2))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "bad_request");
}

/// Test an item becomes due once its interval has passed.
#[tokio::test]
#[ignore = "requires database"]
async fn test_due_reviews() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let user_id = fixtures::unique_user_id("due");
    let path = fixtures::reviews_path(&user_id);

    server
        .post(&path)
        .json(&fixtures::submit_review_request("ch3-q1", 2))
        .await
        .assert_status_ok();

    let response = server.get(&format!("{}/due", path)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["reviews"].as_array().unwrap().len(), 0);

    ctx.clock.advance(Duration::days(2));

    let response = server.get(&format!("{}/due", path)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let reviews = body["reviews"].as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["item_id"], "ch3-q1");

    // Cleanup
    ctx.cleanup_user(&user_id).await;
}

/// Test review statistics of a user.
#[tokio::test]
#[ignore = "requires database"]
async fn test_review_stats() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let user_id = fixtures::unique_user_id("stats");
    let path = fixtures::reviews_path(&user_id);

    let response = server.get(&format!("{}/stats", path)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 0);
    assert_eq!(body["average_ease_factor"], 0.0);

    for item in ["ch4-q1", "ch4-q2"] {
        server
            .post(&path)
            .json(&fixtures::submit_review_request(item, 2))
            .await
            .assert_status_ok();
    }

    let list = server.get(&path).await;
    list.assert_status_ok();
    let body: serde_json::Value = list.json();
    assert_eq!(body["reviews"].as_array().unwrap().len(), 2);

    let response = server.get(&format!("{}/stats", path)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 2);
    assert_eq!(body["due_now"], 0);
    assert_eq!(body["average_ease_factor"], 2.5);

    // Cleanup
    ctx.cleanup_user(&user_id).await;
}

/// Test fetching a single state, and 404 for unknown items.
#[tokio::test]
#[ignore = "requires database"]
async fn test_get_review_state() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let user_id = fixtures::unique_user_id("get");
    let path = fixtures::reviews_path(&user_id);

    let missing = server.get(&format!("{}/ch5-q1", path)).await;
    missing.assert_status(StatusCode::NOT_FOUND);

    server
        .post(&path)
        .json(&fixtures::submit_review_request("ch5-q1", 1))
        .await
        .assert_status_ok();

    let response = server.get(&format!("{}/ch5-q1", path)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["item_id"], "ch5-q1");
    assert_eq!(body["repetitions"], 0);

    // Cleanup
    ctx.cleanup_user(&user_id).await;
}

/// Test every submission is logged in order.
#[tokio::test]
#[ignore = "requires database"]
async fn test_review_history() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let user_id = fixtures::unique_user_id("history");
    let path = fixtures::reviews_path(&user_id);

    for quality in [2, 2, 0] {
        server
            .post(&path)
            .json(&fixtures::submit_review_request("ch6-q1", quality))
            .await
            .assert_status_ok();
        ctx.clock.advance(Duration::hours(1));
    }

    let response = server.get(&format!("{}/ch6-q1/history", path)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let entries = body.as_array().unwrap();

    assert_eq!(entries.len(), 3);
    assert!(entries[0]["interval_before"].is_null());
    assert_eq!(entries[1]["interval_before"], 1);
    assert_eq!(entries[1]["interval_after"], 6);
    assert_eq!(entries[2]["quality"], 0);
    assert_eq!(entries[2]["interval_after"], 1);

    // Cleanup
    ctx.cleanup_user(&user_id).await;
}
