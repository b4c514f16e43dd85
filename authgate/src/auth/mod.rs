//! Request authentication and authorization.
//!
//! Two credential schemes share a single pipeline shape (extract a raw
//! credential, verify it, resolve the identity, attach it to the request):
//!
//! - **Session tokens**: HS256-signed JWTs in `Authorization: Bearer`,
//!   verified against an injected secret and resolved to an account
//!   profile with sensitive fields excluded.
//! - **API keys**: `sk_`-prefixed long-lived keys in `X-API-Key` (with a
//!   bearer-header fallback), hashed and resolved against the identity
//!   store together with the owning account. Successful verification
//!   bumps the key's last-used timestamp off the request path.
//!
//! Every failure is a classified [`crate::errors::AuthError`] rejection;
//! no step is retried and nothing escapes the pipeline boundary
//! unclassified.
//!
//! # Modules
//!
//! - [`session`]: session token creation and verification
//! - [`verifier`]: credential extraction and the shared pipeline skeleton
//! - [`middleware`]: route interceptors and the permission-gate factory
//!
//! # Usage in route wiring
//!
//! ```ignore
//! use axum::{middleware, routing::get, Router};
//! use authgate::auth::middleware::{require_api_key, require_permission};
//!
//! let routes = Router::new()
//!     .route("/v1/metrics", get(metrics_handler))
//!     .route_layer(middleware::from_fn(require_permission("metrics:read")))
//!     .route_layer(middleware::from_fn_with_state(state, require_api_key));
//! ```

pub mod middleware;
pub mod session;
pub mod verifier;
