//! # scribe-api
//!
//! HTTP entry point for scribe: ingestion, ledger lookups and manual
//! scheduler ticks over one shared [`AppContext`].

pub mod config;
pub mod context;
pub mod error;
pub mod handlers;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{AppConfig, StoreKind};
pub use context::AppContext;
pub use error::ApiError;

/// Build the HTTP router.
pub fn app(ctx: AppContext, allowed_origins: Vec<HeaderValue>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/api/v1/contents",
            get(handlers::list_contents).post(handlers::ingest_content),
        )
        .route("/api/v1/contents/:id", get(handlers::get_content))
        .route(
            "/api/v1/contents/:id/artifacts",
            get(handlers::list_artifacts),
        )
        .route("/api/v1/jobs/:id", get(handlers::get_job))
        .route("/api/v1/scheduler", get(handlers::scheduler_status))
        .route("/api/v1/scheduler/tick", post(handlers::run_tick))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    HeaderName::from_static(handlers::USER_HEADER),
                ])
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .with_state(ctx)
}
