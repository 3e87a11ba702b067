//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{ApiError, Result};

// Re-export shared types from study-core
pub use study_core::{GradeFeedback, Quality, ReviewState, ReviewStats};

// === Database Entity Types ===

/// Review state stored in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReviewState {
    pub user_id: String,
    pub item_id: String,
    pub ease_factor: f64,
    pub interval_days: i32,
    pub repetitions: i32,
    pub next_review_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbReviewState {
    /// Create from study-core ReviewState, stamped at `now`
    pub fn from_core_state(user_id: &str, state: &ReviewState, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            user_id: user_id.to_string(),
            item_id: state.item_id.clone(),
            ease_factor: state.ease_factor,
            interval_days: to_column(state.interval, "interval")?,
            repetitions: to_column(state.repetitions, "repetitions")?,
            next_review_at: state.next_review_at,
            created_at: now,
            updated_at: now,
        })
    }

    /// Convert to study-core ReviewState
    pub fn to_core_state(&self) -> Result<ReviewState> {
        let interval = u32::try_from(self.interval_days).map_err(|_| {
            ApiError::Internal(format!(
                "stored interval {} of {} is negative",
                self.interval_days, self.item_id
            ))
        })?;
        let repetitions = u32::try_from(self.repetitions).map_err(|_| {
            ApiError::Internal(format!(
                "stored repetitions {} of {} is negative",
                self.repetitions, self.item_id
            ))
        })?;

        Ok(ReviewState {
            item_id: self.item_id.clone(),
            ease_factor: self.ease_factor,
            interval,
            repetitions,
            next_review_at: self.next_review_at,
        })
    }
}

fn to_column(value: u32, field: &str) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| ApiError::Internal(format!("{field} {value} does not fit in a column")))
}

/// Review event stored in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReview {
    pub id: Uuid,
    pub user_id: String,
    pub item_id: String,
    pub quality: i16,
    pub reviewed_at: DateTime<Utc>,
    pub interval_before: Option<i32>,
    pub interval_after: i32,
    pub ease_before: Option<f64>,
    pub ease_after: f64,
}

impl DbReview {
    /// Log entry for the transition `before` -> `after`
    pub fn new(
        user_id: &str,
        quality: Quality,
        before: Option<&ReviewState>,
        after: &ReviewState,
        reviewed_at: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            item_id: after.item_id.clone(),
            quality: i16::from(quality.value()),
            reviewed_at,
            interval_before: before
                .map(|s| to_column(s.interval, "interval"))
                .transpose()?,
            interval_after: to_column(after.interval, "interval")?,
            ease_before: before.map(|s| s.ease_factor),
            ease_after: after.ease_factor,
        })
    }
}

// === API Request/Response Types ===

/// Grade request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRequest {
    pub user_answer: String,
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

/// Grade response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeResponse {
    pub similarity: f64,
    pub is_correct: bool,
    pub feedback: GradeFeedback,
    pub message: String,
    pub threshold: f64,
    pub typed_normalized: String,
    pub correct_normalized: String,
}

/// Submit review request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReviewRequest {
    pub item_id: String,
    /// 0 = again, 1 = hard, 2 = good, 3 = easy
    pub quality: i64,
}

/// Submit review response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReviewResponse {
    pub state: ReviewState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<ReviewState>,
}

/// Review state list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewState>,
}
