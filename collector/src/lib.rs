//! UXPulse Collector
//!
//! Local collector for the UXPulse SDK: ingests event batches, serves
//! per-screen metrics and the issues derived from them.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                  UXPULSE COLLECTOR                    │
//! ├───────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌──────────────────────────────┐  │
//! │  │  HTTP API    │   │  Issue Job                   │  │
//! │  │  (Axum)      │   │  (periodic, error rates)     │  │
//! │  └──────┬───────┘   └──────────────┬───────────────┘  │
//! │         └────────────┬─────────────┘                  │
//! │                      ▼                                │
//! │               ┌─────────────┐                         │
//! │               │  In-memory  │                         │
//! │               │  Store      │                         │
//! │               └─────────────┘                         │
//! └───────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod store;

use std::sync::Arc;

use axum::{routing::{get, post}, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::Config;
pub use error::{AppError, AppResult};
pub use store::Store;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            store: Arc::new(Store::new()),
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        // Ingestion
        .route("/v1/events/batch", post(handlers::events::ingest))
        // Issues
        .route("/v1/issues", get(handlers::issues::list))
        .route("/v1/issues/:key", get(handlers::issues::get))
        .route("/v1/recommendations", get(handlers::issues::recommendations))
        // Screens
        .route("/v1/screens/:name/metrics", get(handlers::screens::metrics))
        .route("/v1/link-code", post(handlers::link_code::link))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
