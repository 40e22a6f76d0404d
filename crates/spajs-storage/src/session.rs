//! Tab-scoped session storage
//!
//! Entries live only as long as the browsing session that owns them.
//! Cookie options are accepted and ignored.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::client::{decode, ClientStorage, StorageOptions};
use crate::error::StorageError;
use crate::Result;

#[derive(Debug, Default)]
pub struct SessionStorage {
    /// Raw JSON strings by key
    items: Arc<RwLock<HashMap<String, String>>>,
    /// Maximum total bytes (keys + values), if limited
    quota: Option<usize>,
}

impl SessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session storage that rejects writes once keys plus values exceed `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            items: Arc::default(),
            quota: Some(bytes),
        }
    }

    pub fn set_item(&self, key: &str, value: String) -> Result<()> {
        let mut items = self.items.write();

        if let Some(limit) = self.quota {
            let used: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();

            if used + key.len() + value.len() > limit {
                tracing::warn!(key = %key, limit, "Session storage quota exceeded");
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    limit,
                });
            }
        }

        items.insert(key.to_string(), value);
        Ok(())
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items.read().get(key).cloned()
    }

    pub fn remove_item(&self, key: &str) {
        self.items.write().remove(key);
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Drop everything, as when the tab is closed
    pub fn end_session(&self) {
        let mut items = self.items.write();
        let count = items.len();
        items.clear();

        tracing::debug!(entries = count, "Ended storage session");
    }
}

impl ClientStorage for SessionStorage {
    async fn save<T>(&self, key: &str, value: &T, _options: &StorageOptions) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let json = serde_json::to_string(value)?;
        self.set_item(key, json)
    }

    async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        Ok(self.get_item(key).and_then(|raw| decode(key, &raw)))
    }

    async fn remove(&self, key: &str, _options: &StorageOptions) -> Result<()> {
        self.remove_item(key);
        Ok(())
    }
}

impl Clone for SessionStorage {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            quota: self.quota,
        }
    }
}
