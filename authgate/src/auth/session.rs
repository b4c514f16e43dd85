//! Session token creation and verification.
//!
//! Tokens are HS256-signed JWTs. The signing secret is injected at
//! construction through [`SessionKeys`] rather than read from process-wide
//! state, so two services with different secrets can coexist in one
//! process (and tests never touch the environment).

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::db::AccountProfile;
use crate::errors::AuthError;
use crate::types::AccountId;

/// Encoding and decoding keys derived once from the configured secret.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: AccountId,   // Subject (account ID)
    pub username: String, // Login name
    pub email: String,    // Account email
    pub exp: i64,         // Expiration time
    pub iat: i64,         // Issued at
}

impl SessionClaims {
    fn new(account: &AccountProfile, ttl: Duration) -> Self {
        let now = Utc::now();
        let exp = now + ttl;

        Self {
            sub: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Create a signed session token for an account.
///
/// The login endpoint that would call this lives outside this crate; the
/// function is the signing half of the keypair used by verification.
pub fn issue_session_token(
    account: &AccountProfile,
    keys: &SessionKeys,
    ttl: Duration,
) -> anyhow::Result<String> {
    let claims = SessionClaims::new(account, ttl);
    encode(&Header::default(), &claims, &keys.encoding)
        .map_err(|e| anyhow::anyhow!("failed to sign session token: {e}"))
}

/// Verify a session token's signature and decode its claims, then check
/// the expiry timestamp independently of signature validation.
///
/// Classification: a well-signed token past its expiry fails with
/// [`AuthError::TokenExpired`]; an invalid signature or malformed payload
/// fails with [`AuthError::TokenMalformed`]. Pure - no side effects.
pub fn verify_session_token(token: &str, keys: &SessionKeys) -> Result<SessionClaims, AuthError> {
    // Expiry is checked explicitly below, without leeway.
    let mut validation = Validation::default();
    validation.validate_exp = false;

    let token_data = decode::<SessionClaims>(token, &keys.decoding, &validation)
        .map_err(|_| AuthError::TokenMalformed)?;

    if token_data.claims.exp < Utc::now().timestamp() {
        return Err(AuthError::TokenExpired);
    }

    Ok(token_data.claims)
}
