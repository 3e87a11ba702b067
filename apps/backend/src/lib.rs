pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use study_core::{Clock, Scheduler, Sm2, SystemClock};

use crate::config::Config;
use crate::db::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub clock: Arc<dyn Clock>,
    pub scheduler: Arc<dyn Scheduler>,
    pub grading_threshold: f64,
}

impl AppState {
    /// State with the wall clock and the default SM-2 scheduler
    pub fn new(db: Database, grading_threshold: f64) -> Self {
        Self {
            db: Arc::new(db),
            clock: Arc::new(SystemClock),
            scheduler: Arc::new(Sm2::default()),
            grading_threshold,
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Build the full router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/grade", post(routes::grade::grade))
        .route(
            "/api/users/:user_id/reviews",
            get(routes::reviews::list).post(routes::reviews::submit),
        )
        .route("/api/users/:user_id/reviews/due", get(routes::reviews::due))
        .route("/api/users/:user_id/reviews/stats", get(routes::reviews::stats))
        .route("/api/users/:user_id/reviews/:item_id", get(routes::reviews::get))
        .route(
            "/api/users/:user_id/reviews/:item_id/history",
            get(routes::reviews::history),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let state = AppState::new(db, config.grading_threshold);
    let app = router(state);

    let addr = config.bind_addr();
    tracing::info!(
        "Starting server on {} (grading threshold {})",
        addr,
        config.grading_threshold
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
