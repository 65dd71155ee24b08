//! # ieum-api
//!
//! HTTP API server for the Ieum meeting service: meeting analysis,
//! approved-report email fan-out, and dashboard aggregation.

pub mod handlers;
pub mod services;
pub mod state;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub use state::AppState;

/// Frontend origins allowed to call this API.
const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://127.0.0.1:5173"];

#[derive(Serialize)]
struct HealthResponse {
    service: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the application router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze-meeting", post(handlers::analyze::analyze_meeting))
        .route("/execute-action", post(handlers::action::execute_action))
        .route("/dashboard-data", get(handlers::dashboard::dashboard_data))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(
                    ALLOWED_ORIGINS.into_iter().map(HeaderValue::from_static),
                ))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true),
        )
        .with_state(state)
}
