//! The storage capability shared by every backend

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;

use crate::Result;

/// Options passed through to a backend on write and delete.
///
/// Ephemeral backends ignore both fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageOptions {
    /// Days until the persisted copy expires. `None` is a session cookie.
    pub days_until_expire: Option<u32>,
    /// Domain the entry is visible to, and must be deleted from.
    pub cookie_domain: Option<String>,
}

impl StorageOptions {
    pub fn expiring_in(days: u32) -> Self {
        Self {
            days_until_expire: Some(days),
            cookie_domain: None,
        }
    }

    pub fn with_cookie_domain(mut self, cookie_domain: Option<String>) -> Self {
        self.cookie_domain = cookie_domain;
        self
    }
}

/// Key/value capability implemented by every storage backend.
///
/// Values are stored as JSON text. A missing, expired or undecodable entry
/// reads back as `None`; only failures of the underlying store are errors.
pub trait ClientStorage: Send + Sync {
    /// Serialize `value` and write it under `key`, replacing any prior value.
    fn save<T>(
        &self,
        key: &str,
        value: &T,
        options: &StorageOptions,
    ) -> impl Future<Output = Result<()>> + Send
    where
        T: Serialize + Sync;

    /// Read and deserialize the value under `key`.
    fn get<T>(&self, key: &str) -> impl Future<Output = Result<Option<T>>> + Send
    where
        T: DeserializeOwned + Send;

    /// Delete the value under `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str, options: &StorageOptions)
        -> impl Future<Output = Result<()>> + Send;
}

/// Decode a stored JSON string, treating malformed text as absent.
pub(crate) fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(key = %key, error = %e, "Ignoring malformed storage entry");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_options_builders() {
        let options =
            StorageOptions::expiring_in(1).with_cookie_domain(Some("auth.example.com".into()));
        assert_eq!(options.days_until_expire, Some(1));
        assert_eq!(options.cookie_domain.as_deref(), Some("auth.example.com"));

        let defaults = StorageOptions::default();
        assert_eq!(defaults.days_until_expire, None);
        assert_eq!(defaults.cookie_domain, None);
    }

    #[test]
    fn test_decode_malformed_is_none() {
        assert_eq!(decode::<String>("k", "\"value\""), Some("value".to_string()));
        assert_eq!(decode::<String>("k", "{not json"), None);
        assert_eq!(decode::<u32>("k", "\"wrong type\""), None);
    }
}
