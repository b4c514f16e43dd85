//! PostgreSQL implementation of the identity store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use super::{AccountProfile, ApiKeyRecord, IdentityStore, ResolvedApiKey, StoreError};
use crate::types::{abbrev_uuid, AccountId, ApiKeyId};

/// Identity store backed by the `accounts` and `api_keys` tables.
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Flat row for the key-by-hash lookup: the key columns joined with the
/// owning account's minimal profile. Owner columns are nullable because
/// the join is a LEFT JOIN - an orphaned key must stay distinguishable
/// from an unknown one.
#[derive(Debug, FromRow)]
struct ApiKeyJoinRow {
    id: ApiKeyId,
    name: String,
    account_id: AccountId,
    is_active: bool,
    permissions: Vec<String>,
    last_used: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    owner_id: Option<AccountId>,
    owner_username: Option<String>,
    owner_email: Option<String>,
    owner_display_name: Option<String>,
    owner_is_active: Option<bool>,
}

impl From<ApiKeyJoinRow> for ResolvedApiKey {
    fn from(row: ApiKeyJoinRow) -> Self {
        let account = match (row.owner_id, row.owner_username, row.owner_email, row.owner_is_active) {
            (Some(id), Some(username), Some(email), Some(is_active)) => Some(AccountProfile {
                id,
                username,
                email,
                display_name: row.owner_display_name,
                is_active,
            }),
            _ => None,
        };

        Self {
            key: ApiKeyRecord {
                id: row.id,
                name: row.name,
                account_id: row.account_id,
                is_active: row.is_active,
                permissions: row.permissions,
                last_used: row.last_used,
                created_at: row.created_at,
            },
            account,
        }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    #[instrument(skip(self), fields(account_id = %abbrev_uuid(&id)), err)]
    async fn find_account_by_id(&self, id: AccountId) -> Result<Option<AccountProfile>, StoreError> {
        let profile = sqlx::query_as::<_, AccountProfile>(
            r#"
            SELECT id, username, email, display_name, is_active
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    #[instrument(skip(self, key_hash), err)]
    async fn find_active_api_key_by_hash(
        &self,
        key_hash: &str,
    ) -> Result<Option<ResolvedApiKey>, StoreError> {
        let row = sqlx::query_as::<_, ApiKeyJoinRow>(
            r#"
            SELECT
                k.id, k.name, k.account_id, k.is_active, k.permissions,
                k.last_used, k.created_at,
                a.id AS owner_id,
                a.username AS owner_username,
                a.email AS owner_email,
                a.display_name AS owner_display_name,
                a.is_active AS owner_is_active
            FROM api_keys k
            LEFT JOIN accounts a ON a.id = k.account_id
            WHERE k.key_hash = $1 AND k.is_active
            "#,
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ResolvedApiKey::from))
    }

    #[instrument(skip(self), fields(api_key_id = %abbrev_uuid(&id)), err)]
    async fn record_api_key_usage(&self, id: ApiKeyId) -> Result<(), StoreError> {
        sqlx::query("UPDATE api_keys SET last_used = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
