//! Shared constructors for tests: an in-memory identity store plus
//! helpers for building state, accounts and keys.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::session::SessionKeys;
use crate::config::Config;
use crate::crypto;
use crate::db::{AccountProfile, ApiKeyRecord, IdentityStore, ResolvedApiKey, StoreError};
use crate::types::{AccountId, ApiKeyId};
use crate::AppState;

/// In-memory identity store standing in for Postgres in pipeline tests.
///
/// Counts lookups so tests can assert that short-circuiting failures never
/// reach the store, and records usage writes so the fire-and-forget path
/// is observable.
#[derive(Default)]
pub struct MemoryStore {
    accounts: Mutex<HashMap<AccountId, AccountProfile>>,
    keys_by_hash: Mutex<HashMap<String, ApiKeyRecord>>,
    usage: Mutex<Vec<ApiKeyId>>,
    lookups: AtomicUsize,
    fail_lookups: AtomicBool,
    fail_usage_writes: AtomicBool,
}

impl MemoryStore {
    pub fn insert_account(&self, account: AccountProfile) {
        self.accounts.lock().unwrap().insert(account.id, account);
    }

    pub fn insert_key(&self, key_hash: String, record: ApiKeyRecord) {
        self.keys_by_hash.lock().unwrap().insert(key_hash, record);
    }

    /// Number of suspending lookups the pipeline has performed.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn usage_count(&self) -> usize {
        self.usage.lock().unwrap().len()
    }

    pub fn usage_log(&self) -> Vec<ApiKeyId> {
        self.usage.lock().unwrap().clone()
    }

    /// Simulate a store outage for lookups.
    pub fn fail_lookups(&self) {
        self.fail_lookups.store(true, Ordering::SeqCst);
    }

    /// Make only the last-used write fail.
    pub fn fail_usage_writes(&self) {
        self.fail_usage_writes.store(true, Ordering::SeqCst);
    }

    fn check_lookup(&self) -> Result<(), StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(StoreError::Other(anyhow::anyhow!("identity store offline")));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_account_by_id(&self, id: AccountId) -> Result<Option<AccountProfile>, StoreError> {
        self.check_lookup()?;
        Ok(self.accounts.lock().unwrap().get(&id).cloned())
    }

    async fn find_active_api_key_by_hash(
        &self,
        key_hash: &str,
    ) -> Result<Option<ResolvedApiKey>, StoreError> {
        self.check_lookup()?;

        let key = match self.keys_by_hash.lock().unwrap().get(key_hash) {
            Some(key) if key.is_active => key.clone(),
            _ => return Ok(None),
        };

        let account = self.accounts.lock().unwrap().get(&key.account_id).cloned();
        Ok(Some(ResolvedApiKey { key, account }))
    }

    async fn record_api_key_usage(&self, id: ApiKeyId) -> Result<(), StoreError> {
        if self.fail_usage_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Other(anyhow::anyhow!("usage write refused")));
        }
        self.usage.lock().unwrap().push(id);
        Ok(())
    }
}

/// Build request state over the given store with a fixed test secret.
pub fn test_state(store: Arc<MemoryStore>) -> AppState {
    AppState {
        config: Arc::new(Config::default()),
        store,
        session_keys: Arc::new(SessionKeys::new("test-secret-key-for-sessions")),
    }
}

/// An account profile that exists nowhere - for unknown-subject cases.
pub fn unsaved_account() -> AccountProfile {
    let id = Uuid::new_v4();
    AccountProfile {
        id,
        username: format!("user-{}", &id.to_string()[..8]),
        email: format!("{}@example.com", &id.to_string()[..8]),
        display_name: None,
        is_active: true,
    }
}

/// Create an account in the store and return its profile.
pub fn seeded_account(store: &MemoryStore, active: bool) -> AccountProfile {
    let mut account = unsaved_account();
    account.is_active = active;
    store.insert_account(account.clone());
    account
}

/// Issue an API key for `account_id`, store its record under the digest,
/// and return the raw key alongside the record.
pub fn seeded_api_key(
    store: &MemoryStore,
    account_id: AccountId,
    permissions: &[&str],
    active: bool,
) -> (String, ApiKeyRecord) {
    let raw_key = crypto::generate_api_key();
    let record = ApiKeyRecord {
        id: Uuid::new_v4(),
        name: "test key".to_string(),
        account_id,
        is_active: active,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        last_used: None,
        created_at: Utc::now(),
    };

    store.insert_key(crypto::hash_api_key(&raw_key), record.clone());
    (raw_key, record)
}
