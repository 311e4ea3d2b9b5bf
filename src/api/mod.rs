//! HTTP surface
//!
//! Thin axum wiring over the store, lifecycle, and auth modules. Mutating
//! inventory endpoints require an administrator token; submission and reads
//! are open.

pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::TokenIssuer;
use crate::config::AuthConfig;
use crate::store::SharedStore;

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub tokens: TokenIssuer,
    pub auth: AuthConfig,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Credential issuance
        .route("/register", post(routes::register))
        .route("/login", post(routes::login))
        .route("/logout", post(routes::logout))
        // Request lifecycle
        .route("/submit-request", post(routes::submit_request))
        .route("/requests", get(routes::list_requests))
        .route("/requests/:id/resolve", post(routes::resolve_request))
        // Districts and inventory
        .route("/districts", get(routes::list_districts))
        .route("/districts/:id", get(routes::get_district))
        .route("/districts/:id/requests", get(routes::district_requests))
        .route("/districts/:id/inventory", post(routes::adjust_inventory))
        .route(
            "/districts/:src/transfer/:dst",
            post(routes::transfer_inventory),
        )
        // Health check
        .route("/health", get(routes::health))
        .with_state(state)
}
