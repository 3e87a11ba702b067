//! Test fixtures and factory functions for creating test data.

use serde_json::json;
use uuid::Uuid;

/// Create a grade request body.
pub fn grade_request(user_answer: &str, correct_answer: &str) -> serde_json::Value {
    json!({
        "user_answer": user_answer,
        "correct_answer": correct_answer,
    })
}

/// Create a grade request body with an explicit threshold.
pub fn grade_request_with_threshold(
    user_answer: &str,
    correct_answer: &str,
    threshold: f64,
) -> serde_json::Value {
    json!({
        "user_answer": user_answer,
        "correct_answer": correct_answer,
        "threshold": threshold,
    })
}

/// Create a submit review request body.
pub fn submit_review_request(item_id: &str, quality: i64) -> serde_json::Value {
    json!({
        "item_id": item_id,
        "quality": quality,
    })
}

/// Generate a unique test user id to avoid collisions.
pub fn unique_user_id(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().to_string()[..8])
}

/// Reviews path of a user.
pub fn reviews_path(user_id: &str) -> String {
    format!("/api/users/{}/reviews", user_id)
}
