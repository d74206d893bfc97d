//! Route definitions for the oracle server API

use axum::{routing::get, Router};

use crate::app_state::AppState;
use crate::handlers::*;

// Liveness routes
pub fn base_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}

// Dapp routes
pub fn dapp_routes() -> Router<AppState> {
    Router::new().route("/api", get(dapp_info))
}

// Oracle visibility routes
pub fn oracle_routes() -> Router<AppState> {
    Router::new()
        .route("/api/oracles", get(list_oracles))
        .route("/api/stats", get(get_stats))
}
