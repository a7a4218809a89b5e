// Application state module
// Shared by every connection for the lifetime of the server

use std::sync::atomic::AtomicUsize;

use super::types::Config;
use crate::store::AccountStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: AccountStore,
    /// Connections currently being served
    pub active_connections: AtomicUsize,
}

impl AppState {
    /// Create state with an empty store
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store: AccountStore::new(),
            active_connections: AtomicUsize::new(0),
        }
    }
}
