//! Identity store: the persistent source of accounts and API key records.
//!
//! The authentication pipeline consumes the store through the
//! [`IdentityStore`] trait and performs exactly one suspending lookup per
//! request (account by id on the session path, key record by hash on the
//! key path), plus the best-effort last-used write dispatched off the
//! request path. [`postgres::PgIdentityStore`] is the production
//! implementation.

pub mod models;
pub mod postgres;

pub use models::{AccountProfile, ApiKeyRecord, ResolvedApiKey};
pub use postgres::PgIdentityStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{AccountId, ApiKeyId};

/// Unified error type for identity store operations.
///
/// Store failures are never credential-validity problems; the pipeline
/// classifies them separately as service-level faults.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Load the safe projection of an account by id.
    ///
    /// Sensitive fields (password hash, lockout counters) are never part
    /// of the returned projection.
    async fn find_account_by_id(&self, id: AccountId) -> Result<Option<AccountProfile>, StoreError>;

    /// Look up an active API key by the digest of its raw material, joined
    /// with the owning account's minimal profile.
    ///
    /// Inactive key records are treated as absent. A key whose owning
    /// account row is gone still resolves, with `account: None`, so the
    /// pipeline can distinguish an unknown key from an orphaned one.
    async fn find_active_api_key_by_hash(
        &self,
        key_hash: &str,
    ) -> Result<Option<ResolvedApiKey>, StoreError>;

    /// Best-effort bump of a key's last-used timestamp.
    ///
    /// Concurrent bumps for the same key are last-write-wins; callers
    /// dispatch this without awaiting it on the request path.
    async fn record_api_key_usage(&self, id: ApiKeyId) -> Result<(), StoreError>;
}
