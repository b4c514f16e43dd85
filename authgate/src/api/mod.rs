//! HTTP surface: route wiring for the authentication interceptors.
//!
//! Three protected surfaces demonstrate the three gates:
//!
//! - `/admin/api/v1/*` - session-token pipeline
//! - `/v1/key` - API-key pipeline
//! - `/v1/metrics` - API-key pipeline plus a permission gate on
//!   `metrics:read`

pub mod handlers;

use axum::{middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::middleware::{require_api_key, require_permission, require_session};
use crate::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/admin/api/v1/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    let key_routes = Router::new()
        .route("/v1/key", get(handlers::current_key))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    // route_layer runs bottom-up: key authentication first, then the gate.
    let gated_routes = Router::new()
        .route("/v1/metrics", get(handlers::metrics))
        .route_layer(middleware::from_fn(require_permission("metrics:read")))
        .route_layer(middleware::from_fn_with_state(state, require_api_key));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(session_routes)
        .merge(key_routes)
        .merge(gated_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
