//! In-memory account store
//!
//! Every operation takes the lock exactly once, so each get, put and remove is
//! atomic with respect to the others. Nothing is persisted.

use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::account::AccountData;

/// Mapping from account identifier to account record
#[derive(Debug, Default)]
pub struct AccountStore {
    records: RwLock<HashMap<String, AccountData>>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a copy of the record stored under `id`
    pub async fn get(&self, id: &str) -> Option<AccountData> {
        self.records.read().await.get(id).cloned()
    }

    /// Insert or overwrite the record stored under `id`.
    ///
    /// Returns the record that was replaced, if any. No version check is made.
    pub async fn put(&self, id: String, account: AccountData) -> Option<AccountData> {
        self.records.write().await.insert(id, account)
    }

    /// Remove and return the record stored under `id`
    pub async fn remove(&self, id: &str) -> Option<AccountData> {
        self.records.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
