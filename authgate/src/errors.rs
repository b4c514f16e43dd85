//! Classified authentication failures and the rejection payload returned
//! to callers.
//!
//! Every failure the pipeline can produce is a variant here, each with a
//! stable machine-readable code and an HTTP status: 401 for credential and
//! identity failures, 403 for insufficient permission, 500 for identity
//! store faults. The [`IntoResponse`] impl is the single outermost
//! boundary where failures become responses; store faults are logged there
//! and downgraded to a generic message so internal detail never reaches
//! the caller.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

use crate::db::StoreError;

#[derive(ThisError, Debug)]
pub enum AuthError {
    /// No session token supplied
    #[error("No session token provided")]
    NoToken,

    /// Token signature is valid but the expiry timestamp has passed
    #[error("Session token has expired")]
    TokenExpired,

    /// Token signature is invalid or the payload is malformed
    #[error("Session token is invalid")]
    TokenMalformed,

    /// Well-formed token whose subject no longer resolves to an account
    #[error("Session token subject does not resolve to an account")]
    IdentityNotFound,

    /// Session account exists but is deactivated
    #[error("Account is deactivated")]
    AccountDeactivated,

    /// No API key supplied
    #[error("No API key provided")]
    NoApiKey,

    /// API key present but does not match the required format
    #[error("API key does not match the expected format")]
    InvalidApiKeyFormat,

    /// Well-formed API key with no matching active record
    #[error("Invalid API key")]
    InvalidApiKey,

    /// API key record is active but its owning account is missing or deactivated
    #[error("API key owner is deactivated")]
    UserDeactivated,

    /// Permission check ran without an authenticated API key attached
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Authenticated API key lacks the required capability
    #[error("Missing required permission: {required}")]
    InsufficientPermission { required: String },

    /// Identity store or hashing infrastructure failure
    #[error(transparent)]
    Service(#[from] StoreError),
}

impl AuthError {
    /// Stable machine-readable rejection code.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::NoToken => "NO_TOKEN",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            // A resolvable-but-gone subject is indistinguishable from a
            // forged token as far as callers are concerned.
            AuthError::TokenMalformed | AuthError::IdentityNotFound => "INVALID_TOKEN",
            AuthError::AccountDeactivated => "ACCOUNT_DEACTIVATED",
            AuthError::NoApiKey => "NO_API_KEY",
            AuthError::InvalidApiKeyFormat => "INVALID_API_KEY_FORMAT",
            AuthError::InvalidApiKey => "INVALID_API_KEY",
            AuthError::UserDeactivated => "USER_DEACTIVATED",
            AuthError::AuthenticationRequired => "AUTH_REQUIRED",
            AuthError::InsufficientPermission { .. } => "INSUFFICIENT_PERMISSIONS",
            AuthError::Service(_) => "AUTH_SERVICE_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InsufficientPermission { .. } => StatusCode::FORBIDDEN,
            AuthError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Service(_) => "Authentication service error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::Service(_) => {
                tracing::error!("Authentication service error: {:#}", self);
            }
            AuthError::InsufficientPermission { .. } | AuthError::AuthenticationRequired => {
                tracing::info!("Authorization rejection: {}", self);
            }
            _ => {
                tracing::debug!("Authentication rejection: {}", self);
            }
        }

        let body = json!({
            "message": self.user_message(),
            "code": self.code(),
        });

        (self.status_code(), Json(body)).into_response()
    }
}
