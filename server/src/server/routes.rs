//! Router configuration for the Carebook server.
//!
//! Builds the complete Axum router with all endpoints.

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{availability, bookings, providers};
use crate::middleware::request_id_layer;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// # Arguments
///
/// - `state`: Application state to share with handlers
///
/// # Returns
///
/// Configured Axum router ready to serve requests.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Provider catalog
        .route("/providers", get(providers::list_providers))
        // Availability queries
        .route("/providers/:id/slots", get(availability::list_provider_slots))
        // Booking flow
        .route(
            "/bookings",
            post(bookings::create_booking).get(bookings::list_bookings),
        );

    Router::new()
        // Health checks (no middleware requirements)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // API routes under /api prefix
        .nest("/api", api_routes)
        .layer(request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
