//! Grading endpoint

use axum::{extract::State, Json};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;
use study_core::grade_answer;

/// POST /api/grade
pub async fn grade(
    State(state): State<AppState>,
    Json(payload): Json<GradeRequest>,
) -> Result<Json<GradeResponse>> {
    let threshold = payload.threshold.unwrap_or(state.grading_threshold);
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ApiError::BadRequest(format!(
            "threshold {threshold} must be between 0 and 1"
        )));
    }

    let result = grade_answer(&payload.user_answer, &payload.correct_answer, threshold);

    tracing::debug!(
        similarity = result.similarity,
        is_correct = result.is_correct,
        "graded answer"
    );

    Ok(Json(GradeResponse {
        similarity: result.similarity,
        is_correct: result.is_correct,
        feedback: result.feedback,
        message: result.feedback.message().to_string(),
        threshold,
        typed_normalized: result.typed_normalized,
        correct_normalized: result.correct_normalized,
    }))
}
