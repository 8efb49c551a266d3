//! API route configuration.

use crate::api::handlers::{health_handler, users_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Public API routes.
///
/// # Endpoints
///
/// - `GET /users`  - Full user dataset (cache-aside)
/// - `GET /health` - Cache store health
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users_handler))
        .route("/health", get(health_handler))
}
