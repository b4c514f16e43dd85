//! Route interceptors: the two pipeline entry points and the permission gate.
//!
//! [`require_session`] and [`require_api_key`] run the shared pipeline,
//! attach the resolved identity to the request extensions and hand over to
//! the next stage, or finalize the response themselves with the classified
//! rejection. [`require_permission`] builds the capability-gating
//! interceptor applied after key authentication.

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::verifier::{authenticate, ApiKeyAuth, CurrentApiKey, SessionAuth};
use crate::errors::AuthError;
use crate::AppState;

/// Session-token pipeline stage.
///
/// On success the resolved account profile is attached to the request as
/// [`super::verifier::CurrentAccount`]; on failure the rejection is
/// finalized here and the route handler never runs.
pub async fn require_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match authenticate::<SessionAuth>(&state, request.headers()).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(error) => error.into_response(),
    }
}

/// API-key pipeline stage. Attaches [`CurrentApiKey`] on success.
pub async fn require_api_key(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match authenticate::<ApiKeyAuth>(&state, request.headers()).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(error) => error.into_response(),
    }
}

/// Build an interceptor admitting only API keys that grant `capability`
/// (or the universal capability).
///
/// Must run after [`require_api_key`]: when no key is attached the request
/// is rejected with `AUTH_REQUIRED` before any permission set is inspected.
pub fn require_permission(
    capability: &'static str,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Response> + Send>> + Clone {
    move |request, next| Box::pin(permission_gate(capability, request, next))
}

async fn permission_gate(capability: &'static str, request: Request, next: Next) -> Response {
    let Some(identity) = request.extensions().get::<CurrentApiKey>() else {
        return AuthError::AuthenticationRequired.into_response();
    };

    if !identity.key.grants(capability) {
        return AuthError::InsufficientPermission {
            required: capability.to_string(),
        }
        .into_response();
    }

    next.run(request).await
}
