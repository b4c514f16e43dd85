//! Route handlers behind the authentication interceptors.
//!
//! Deliberately thin: the business logic behind each route is not this
//! crate's concern. They host the pipeline stages and surface the identity
//! the pipeline attached to the request.

use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::auth::verifier::{CurrentAccount, CurrentApiKey};
use crate::db::AccountProfile;

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Return the session-authenticated account profile.
pub async fn me(Extension(CurrentAccount(account)): Extension<CurrentAccount>) -> Json<AccountProfile> {
    Json(account)
}

/// Return a summary of the API key the request authenticated with.
pub async fn current_key(Extension(identity): Extension<CurrentApiKey>) -> Json<Value> {
    Json(json!({
        "id": identity.key.id,
        "name": identity.key.name,
        "permissions": identity.key.permissions,
        "last_used": identity.key.last_used,
        "account": {
            "id": identity.account.id,
            "username": identity.account.username,
        },
    }))
}

/// Permission-gated metrics snapshot.
pub async fn metrics(Extension(identity): Extension<CurrentApiKey>) -> Json<Value> {
    Json(json!({
        "requested_by": identity.key.id,
        "series": [],
    }))
}
