//! HTTP transport
//!
//! Thin axum layer over the analysis pipeline and its collaborators.

pub mod handlers;
pub mod models;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::analysis::ContractAnalyzer;
use crate::auth::AuthProvider;
use crate::extractor::TextExtractor;
use crate::report::DocumentRenderer;

pub use models::{error_codes, ApiError};

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<ContractAnalyzer>,
    pub extractor: Arc<dyn TextExtractor>,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub auth: Arc<dyn AuthProvider>,
    pub report_dir: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    pub max_body_bytes: usize,
    pub cors_permissive: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            max_body_bytes: 10 * 1024 * 1024,
            cors_permissive: true,
        }
    }
}

pub fn build_router(state: AppState, options: RouterOptions) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/api/v1/analyze", post(handlers::analyze))
        .route("/api/v1/analyze/document", post(handlers::analyze_document))
        .route("/api/v1/reports", post(handlers::render_report))
        .route("/api/v1/auth/register", post(handlers::register))
        .route("/api/v1/auth/login", post(handlers::login))
        .route("/api/v1/auth/me", get(handlers::current_user))
        .layer(DefaultBodyLimit::disable())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(options.max_body_bytes)),
        )
        .with_state(state);

    if options.cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
