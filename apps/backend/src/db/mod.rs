//! PostgreSQL database operations

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};

use crate::error::{ApiError, Result};
use crate::models::*;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a pool that only connects on first use
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    // === Review State Repository ===

    /// Get review state of one item
    pub async fn get_review_state(
        &self,
        user_id: &str,
        item_id: &str,
    ) -> Result<Option<DbReviewState>> {
        let state = sqlx::query_as::<_, DbReviewState>(
            r#"
            SELECT user_id, item_id, ease_factor, interval_days, repetitions,
                   next_review_at, created_at, updated_at
            FROM review_states
            WHERE user_id = $1 AND item_id = $2
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(state)
    }

    /// Get all review states of a user
    pub async fn list_review_states(&self, user_id: &str) -> Result<Vec<DbReviewState>> {
        let states = sqlx::query_as::<_, DbReviewState>(
            r#"
            SELECT user_id, item_id, ease_factor, interval_days, repetitions,
                   next_review_at, created_at, updated_at
            FROM review_states
            WHERE user_id = $1
            ORDER BY item_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(states)
    }

    /// Apply one review to an item atomically.
    ///
    /// A transaction-scoped advisory lock on `(user_id, item_id)` serializes
    /// reviews of the same item, including its first one when no row exists
    /// yet. `schedule` computes the replacement state, and the new state plus
    /// a log row are written in the same transaction.
    pub async fn apply_review<F>(
        &self,
        user_id: &str,
        item_id: &str,
        quality: Quality,
        reviewed_at: DateTime<Utc>,
        schedule: F,
    ) -> Result<(Option<ReviewState>, ReviewState)>
    where
        F: FnOnce(Option<&ReviewState>) -> study_core::Result<ReviewState>,
    {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1), hashtext($2))")
            .bind(user_id)
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        let previous = sqlx::query_as::<_, DbReviewState>(
            r#"
            SELECT user_id, item_id, ease_factor, interval_days, repetitions,
                   next_review_at, created_at, updated_at
            FROM review_states
            WHERE user_id = $1 AND item_id = $2
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await?
        .map(|s| s.to_core_state())
        .transpose()?;

        let next = schedule(previous.as_ref())?;

        let db_state = DbReviewState::from_core_state(user_id, &next, reviewed_at)?;
        Self::upsert_review_state(&mut tx, &db_state).await?;

        let review = DbReview::new(user_id, quality, previous.as_ref(), &next, reviewed_at)?;
        Self::insert_review(&mut tx, &review).await?;

        tx.commit().await?;

        Ok((previous, next))
    }

    async fn upsert_review_state(
        tx: &mut Transaction<'_, Postgres>,
        state: &DbReviewState,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO review_states (user_id, item_id, ease_factor, interval_days,
                                       repetitions, next_review_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id, item_id) DO UPDATE SET
                ease_factor = EXCLUDED.ease_factor,
                interval_days = EXCLUDED.interval_days,
                repetitions = EXCLUDED.repetitions,
                next_review_at = EXCLUDED.next_review_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&state.user_id)
        .bind(&state.item_id)
        .bind(state.ease_factor)
        .bind(state.interval_days)
        .bind(state.repetitions)
        .bind(state.next_review_at)
        .bind(state.created_at)
        .bind(state.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn insert_review(tx: &mut Transaction<'_, Postgres>, review: &DbReview) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO review_log (id, user_id, item_id, quality, reviewed_at,
                                    interval_before, interval_after, ease_before, ease_after)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(review.id)
        .bind(&review.user_id)
        .bind(&review.item_id)
        .bind(review.quality)
        .bind(review.reviewed_at)
        .bind(review.interval_before)
        .bind(review.interval_after)
        .bind(review.ease_before)
        .bind(review.ease_after)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Get the review history of one item, oldest first
    pub async fn get_review_log(&self, user_id: &str, item_id: &str) -> Result<Vec<DbReview>> {
        let reviews = sqlx::query_as::<_, DbReview>(
            r#"
            SELECT id, user_id, item_id, quality, reviewed_at,
                   interval_before, interval_after, ease_before, ease_after
            FROM review_log
            WHERE user_id = $1 AND item_id = $2
            ORDER BY reviewed_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    /// Delete all review data of a user, returning the number of states removed
    pub async fn delete_user_reviews(&self, user_id: &str) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM review_log WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM review_states WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }
}
