//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up the test environment with a database
//! - A frozen clock so scheduling results are predictable
//! - Helpers for generating isolated user ids and cleaning up after them
//!
//! # Requirements
//! Review tests require a PostgreSQL database (set DATABASE_URL env var).
//! Grading tests use a lazily connected pool and never touch the database.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, TimeZone, Utc};

use study_backend::db::Database;
use study_backend::{router, AppState};
use study_core::{FixedClock, DEFAULT_THRESHOLD};

/// Instant every test context starts at.
pub fn test_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
}

/// Test context containing database connection, clock and router.
pub struct TestContext {
    pub db: Arc<Database>,
    pub clock: Arc<FixedClock>,
    app: Router,
}

impl TestContext {
    /// Create a new test context connected to the test database.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        Self::with_database(db)
    }

    /// Create a test context whose pool never connects unless used.
    ///
    /// Use this for endpoints that do not read or write the database.
    pub fn without_database() -> Self {
        let db = Database::connect_lazy("postgres://localhost/study_unused")
            .expect("Failed to create lazy pool");
        Self::with_database(db)
    }

    fn with_database(db: Database) -> Self {
        let clock = Arc::new(FixedClock::new(test_start()));
        let state = AppState::new(db, DEFAULT_THRESHOLD).with_clock(clock.clone());
        let db = state.db.clone();
        let app = router(state);

        Self { db, clock, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Clean up all review data of a user.
    pub async fn cleanup_user(&self, user_id: &str) {
        let _ = self.db.delete_user_reviews(user_id).await;
    }
}
