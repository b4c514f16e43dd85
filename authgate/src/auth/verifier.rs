//! The authentication pipeline core.
//!
//! Both credential schemes share one shape - extract a raw credential
//! from the headers, verify it, resolve the identity it names - expressed
//! as the [`CredentialVerifier`] trait with two implementations:
//! [`SessionAuth`] (bearer session tokens) and [`ApiKeyAuth`] (long-lived
//! API keys). [`authenticate`] is the shared orchestration skeleton; a
//! failure at any step short-circuits the rest and every failure is a
//! classified [`AuthError`]. No step is retried.

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use tracing::{debug, instrument, warn};

use super::session::verify_session_token;
use crate::crypto;
use crate::db::{AccountProfile, ApiKeyRecord};
use crate::errors::AuthError;
use crate::types::abbrev_uuid;
use crate::AppState;

/// Name of the dedicated API key header.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Pull a bearer credential out of the `Authorization` header, stripping
/// the `Bearer ` prefix. Absence is a normal outcome.
pub fn bearer_credential(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

/// Pull an API key credential: the dedicated `X-API-Key` header wins;
/// only when it is absent does the bearer-prefixed `Authorization` header
/// get consulted.
pub fn api_key_credential(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(API_KEY_HEADER) {
        return value.to_str().ok().map(|key| key.to_string());
    }

    bearer_credential(headers)
}

/// One authentication scheme: how its credential is extracted and how the
/// credential becomes an attached identity.
#[async_trait]
pub trait CredentialVerifier {
    /// Identity attached to the request context on success.
    type Identity: Clone + Send + Sync + 'static;

    /// Pull the raw credential out of the request headers.
    fn extract(headers: &HeaderMap) -> Option<String>;

    /// Failure reported when no credential is present.
    fn missing() -> AuthError;

    /// Verify the credential and resolve the identity it names.
    async fn verify(state: &AppState, credential: &str) -> Result<Self::Identity, AuthError>;
}

/// Shared pipeline skeleton: extract -> verify -> resolve. Every failure
/// is terminal for the request.
pub async fn authenticate<V: CredentialVerifier>(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<V::Identity, AuthError> {
    let Some(credential) = V::extract(headers) else {
        return Err(V::missing());
    };

    V::verify(state, &credential).await
}

/// Account attached to the request context by the session pipeline.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub AccountProfile);

/// Bearer session-token authentication.
pub struct SessionAuth;

#[async_trait]
impl CredentialVerifier for SessionAuth {
    type Identity = CurrentAccount;

    fn extract(headers: &HeaderMap) -> Option<String> {
        bearer_credential(headers)
    }

    fn missing() -> AuthError {
        AuthError::NoToken
    }

    #[instrument(skip_all)]
    async fn verify(state: &AppState, credential: &str) -> Result<Self::Identity, AuthError> {
        if credential.is_empty() {
            return Err(AuthError::NoToken);
        }

        let claims = verify_session_token(credential, &state.session_keys)?;

        let account = state
            .store
            .find_account_by_id(claims.sub)
            .await?
            .ok_or(AuthError::IdentityNotFound)?;

        if !account.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        debug!(account_id = %abbrev_uuid(&account.id), "session authenticated");
        Ok(CurrentAccount(account))
    }
}

/// API key identity attached to the request context by the key pipeline.
#[derive(Debug, Clone)]
pub struct CurrentApiKey {
    pub key: ApiKeyRecord,
    pub account: AccountProfile,
}

/// Long-lived API key authentication.
pub struct ApiKeyAuth;

#[async_trait]
impl CredentialVerifier for ApiKeyAuth {
    type Identity = CurrentApiKey;

    fn extract(headers: &HeaderMap) -> Option<String> {
        api_key_credential(headers)
    }

    fn missing() -> AuthError {
        AuthError::NoApiKey
    }

    #[instrument(skip_all)]
    async fn verify(state: &AppState, credential: &str) -> Result<Self::Identity, AuthError> {
        if credential.is_empty() {
            return Err(AuthError::NoApiKey);
        }

        // Format check happens before any store traffic.
        if !credential.starts_with(crypto::API_KEY_PREFIX) {
            return Err(AuthError::InvalidApiKeyFormat);
        }

        let key_hash = crypto::hash_api_key(credential);

        let resolved = state
            .store
            .find_active_api_key_by_hash(&key_hash)
            .await?
            .ok_or(AuthError::InvalidApiKey)?;

        let account = match resolved.account {
            Some(account) if account.is_active => account,
            // Owner missing or deactivated: the key record itself may
            // still be active, the request is rejected either way.
            _ => return Err(AuthError::UserDeactivated),
        };

        // Bump last-used off the request path. The response never waits
        // on this write and a failure only gets logged.
        let store = state.store.clone();
        let key_id = resolved.key.id;
        tokio::spawn(async move {
            if let Err(error) = store.record_api_key_usage(key_id).await {
                warn!(api_key_id = %abbrev_uuid(&key_id), "failed to record API key usage: {error:#}");
            }
        });

        debug!(api_key_id = %abbrev_uuid(&resolved.key.id), account_id = %abbrev_uuid(&account.id), "api key authenticated");
        Ok(CurrentApiKey {
            key: resolved.key,
            account,
        })
    }
}
