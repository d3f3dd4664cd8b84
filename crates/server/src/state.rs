//! Shared handler state.

use crate::error::AppError;
use sidechain_chain::{Ledger, LedgerConfig};
use sidechain_storage::{Storage, StorageError};
use std::path::Path;
use std::sync::Arc;

/// State shared by every handler: the open store and the ledger settings.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub config: LedgerConfig,
}

impl AppState {
    pub fn new(storage: Storage, config: LedgerConfig) -> Self {
        Self {
            storage: Arc::new(storage),
            config,
        }
    }

    pub fn open<P: AsRef<Path>>(path: P, config: LedgerConfig) -> Result<Self, StorageError> {
        Ok(Self::new(Storage::open(path)?, config))
    }

    /// In-memory store (for testing).
    pub fn temporary(config: LedgerConfig) -> Result<Self, StorageError> {
        Ok(Self::new(Storage::open_temporary()?, config))
    }

    /// Run `f` against the ledger on the blocking pool; sled calls and the
    /// sealing lock never run on the async workers.
    pub async fn with_ledger<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&Ledger<'_>) -> sidechain_chain::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        let config = self.config.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let ledger = Ledger::new(&storage, config);
            f(&ledger)
        })
        .await
        .map_err(|e| AppError::Internal(format!("ledger task failed: {e}")))?;
        Ok(outcome?)
    }
}
