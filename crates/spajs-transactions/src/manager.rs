//! Transaction Manager
//!
//! Stores a single transaction per client id in whichever storage it was
//! built with.

use spajs_storage::{ClientStorage, Result, StorageOptions};

use crate::transaction::Transaction;

pub const TRANSACTION_STORAGE_KEY_PREFIX: &str = "a0.spajs.txs";

/// Transactions are only needed for the length of one redirect round-trip
pub const TRANSACTION_EXPIRY_DAYS: u32 = 1;

#[derive(Debug, Clone)]
pub struct TransactionManager<S> {
    storage: S,
    client_id: String,
    cookie_domain: Option<String>,
    /// Computed once; never rebuilt from `client_id`
    storage_key: String,
}

impl<S: ClientStorage> TransactionManager<S> {
    pub fn new(storage: S, client_id: impl Into<String>, cookie_domain: Option<String>) -> Self {
        let client_id = client_id.into();
        let storage_key = format!("{}.{}", TRANSACTION_STORAGE_KEY_PREFIX, client_id);

        Self {
            storage,
            client_id,
            cookie_domain,
            storage_key,
        }
    }

    /// Save `transaction`, replacing any transaction already in flight
    pub async fn create(&self, transaction: &Transaction) -> Result<()> {
        let options = StorageOptions::expiring_in(TRANSACTION_EXPIRY_DAYS)
            .with_cookie_domain(self.cookie_domain.clone());

        self.storage
            .save(&self.storage_key, transaction, &options)
            .await?;

        tracing::debug!(storage_key = %self.storage_key, "Created transaction");

        Ok(())
    }

    /// The transaction in flight, if any
    pub async fn get(&self) -> Result<Option<Transaction>> {
        self.storage.get(&self.storage_key).await
    }

    pub async fn remove(&self) -> Result<()> {
        let options = StorageOptions::default().with_cookie_domain(self.cookie_domain.clone());

        self.storage.remove(&self.storage_key, &options).await?;

        tracing::debug!(storage_key = %self.storage_key, "Removed transaction");

        Ok(())
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn cookie_domain(&self) -> Option<&str> {
        self.cookie_domain.as_deref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
