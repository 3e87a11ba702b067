//! Review scheduling endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;
use study_core::{review_stats, select_due};

async fn load_states(state: &AppState, user_id: &str) -> Result<Vec<ReviewState>> {
    state
        .db
        .list_review_states(user_id)
        .await?
        .iter()
        .map(DbReviewState::to_core_state)
        .collect()
}

/// GET /api/users/:user_id/reviews
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ReviewListResponse>> {
    let reviews = load_states(&state, &user_id).await?;
    Ok(Json(ReviewListResponse { reviews }))
}

/// GET /api/users/:user_id/reviews/due
pub async fn due(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ReviewListResponse>> {
    let all = load_states(&state, &user_id).await?;
    let reviews = select_due(&all, state.clock.now())
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(ReviewListResponse { reviews }))
}

/// GET /api/users/:user_id/reviews/stats
pub async fn stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ReviewStats>> {
    let all = load_states(&state, &user_id).await?;
    Ok(Json(review_stats(&all, state.clock.now())))
}

/// GET /api/users/:user_id/reviews/:item_id
pub async fn get(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(String, String)>,
) -> Result<Json<ReviewState>> {
    let db_state = state
        .db
        .get_review_state(&user_id, &item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Review state for {item_id}")))?;

    Ok(Json(db_state.to_core_state()?))
}

/// GET /api/users/:user_id/reviews/:item_id/history
pub async fn history(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(String, String)>,
) -> Result<Json<Vec<DbReview>>> {
    let reviews = state.db.get_review_log(&user_id, &item_id).await?;
    Ok(Json(reviews))
}

/// POST /api/users/:user_id/reviews
pub async fn submit(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<SubmitReviewRequest>,
) -> Result<Json<SubmitReviewResponse>> {
    let item_id = payload.item_id.trim();
    if item_id.is_empty() {
        return Err(ApiError::BadRequest("item_id must not be empty".to_string()));
    }

    let quality = Quality::from_value(payload.quality)?;
    let now = state.clock.now();
    let scheduler = state.scheduler.clone();

    let (previous, next) = state
        .db
        .apply_review(&user_id, item_id, quality, now, |previous| {
            scheduler.schedule(previous, item_id, quality, now)
        })
        .await?;

    tracing::info!(
        user = %user_id,
        item = %next.item_id,
        quality = quality.value(),
        interval = next.interval,
        "review recorded"
    );

    Ok(Json(SubmitReviewResponse {
        state: next,
        previous,
    }))
}
