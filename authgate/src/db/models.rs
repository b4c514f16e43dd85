//! Row and projection types for the identity store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::types::{AccountId, ApiKeyId};

/// The projection of an account that is safe to attach to a request
/// context. Password hashes and lockout bookkeeping stay in the store.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AccountProfile {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub is_active: bool,
}

/// A long-lived credential bound to one account. Only the digest of the
/// raw key material is ever stored.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApiKeyRecord {
    pub id: ApiKeyId,
    pub name: String,
    pub account_id: AccountId,
    pub is_active: bool,
    pub permissions: Vec<String>,
    pub last_used: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ApiKeyRecord {
    /// Reserved capability that implies every other permission.
    pub const UNIVERSAL_CAPABILITY: &'static str = "admin";

    /// Whether this key authorizes the named capability.
    pub fn grants(&self, capability: &str) -> bool {
        self.permissions
            .iter()
            .any(|granted| granted == capability || granted == Self::UNIVERSAL_CAPABILITY)
    }
}

/// An API key record resolved together with its owning account.
#[derive(Debug, Clone)]
pub struct ResolvedApiKey {
    pub key: ApiKeyRecord,
    /// `None` when the owning account row no longer exists.
    pub account: Option<AccountProfile>,
}
