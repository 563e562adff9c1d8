//! API router configuration

use axum::{
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/v1/validate", post(handlers::validate))
        .route("/api/v1/register", post(handlers::register))
        .route("/api/v1/update", post(handlers::update))
        .route("/api/v1/user", get(handlers::user))
        .route(
            "/api/v1/verify-registration",
            post(handlers::verify_registration),
        )
        .route("/api/v1/verify-update", post(handlers::verify_update))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request| {
                        tracing::info_span!(
                            "request",
                            id = %Uuid::new_v4(),
                            method = %request.method(),
                            path = %request.uri().path(),
                        )
                    }),
                )
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}
