//! API Routes
//!
//! This module organizes all HTTP endpoints for the application:
//! - `/search/` - Keyword search (POST)
//! - `/api/health` - Health checks
//! - `/` - Search page

pub mod health;
pub mod search;
pub mod ui;

use axum::Router;
use tower_http::trace::TraceLayer;
use crate::middleware::cors_layer;
use crate::models::AppState;
use tracing::info;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        .merge(search::router(state.clone()))
        .merge(health::router(state))
        .merge(ui::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
