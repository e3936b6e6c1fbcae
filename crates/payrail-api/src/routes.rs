//! # Routes
//!
//! Axum router configuration for the payment API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /health
/// - POST /api/v1/{provider}/preauthorize
/// - POST /api/v1/{provider}/orders/{order_id}/charge
/// - POST /api/v1/{provider}/refunds
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let provider_routes = Router::new()
        .route("/{provider}/preauthorize", post(handlers::preauthorize))
        .route(
            "/{provider}/orders/{order_id}/charge",
            post(handlers::charge),
        )
        .route("/{provider}/refunds", post(handlers::refund));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", provider_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
