//! API Routes
//!
//! Route table for the expiring-cache server, split into key operations and
//! maintenance endpoints, wrapped in CORS and request tracing.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, delete_handler, get_handler, health_handler, set_handler, sweep_handler,
    AppState,
};

/// Builds the full application router.
///
/// # Endpoints
/// - `PUT /set` - Store a key-value pair, optionally with `ttl_ms`
/// - `GET /get/:key` - Read a live value
/// - `DELETE /del/:key` - Delete a key
/// - `DELETE /clear` - Delete every key
/// - `POST /sweep` - Run an expiry pass now
/// - `GET /health` - Liveness plus stored entry count
pub fn create_router(state: AppState) -> Router {
    key_routes()
        .merge(maintenance_routes())
        .layer(permissive_cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// == Key Operations ==
fn key_routes() -> Router<AppState> {
    Router::new()
        .route("/set", put(set_handler))
        .route("/get/:key", get(get_handler))
        .route("/del/:key", delete(delete_handler))
}

// == Maintenance ==
fn maintenance_routes() -> Router<AppState> {
    Router::new()
        .route("/clear", delete(clear_handler))
        .route("/sweep", post(sweep_handler))
        .route("/health", get(health_handler))
}

/// Any origin, method and header.
fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
