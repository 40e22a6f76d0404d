//! Runtime choice of storage backend

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{ClientStorage, StorageOptions};
use crate::cookie::CookieStorage;
use crate::legacy::LegacySameSiteCookieStorage;
use crate::session::SessionStorage;
use crate::Result;

/// One of the built-in backends, for callers that pick a store from config
#[derive(Debug, Clone)]
pub enum StorageBackend {
    Session(SessionStorage),
    Cookie(CookieStorage),
    LegacyCookie(LegacySameSiteCookieStorage),
}

impl StorageBackend {
    pub fn kind(&self) -> &'static str {
        match self {
            StorageBackend::Session(_) => "session",
            StorageBackend::Cookie(_) => "cookie",
            StorageBackend::LegacyCookie(_) => "legacy_cookie",
        }
    }
}

impl ClientStorage for StorageBackend {
    async fn save<T>(&self, key: &str, value: &T, options: &StorageOptions) -> Result<()>
    where
        T: Serialize + Sync,
    {
        match self {
            StorageBackend::Session(s) => s.save(key, value, options).await,
            StorageBackend::Cookie(s) => s.save(key, value, options).await,
            StorageBackend::LegacyCookie(s) => s.save(key, value, options).await,
        }
    }

    async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self {
            StorageBackend::Session(s) => s.get(key).await,
            StorageBackend::Cookie(s) => s.get(key).await,
            StorageBackend::LegacyCookie(s) => s.get(key).await,
        }
    }

    async fn remove(&self, key: &str, options: &StorageOptions) -> Result<()> {
        match self {
            StorageBackend::Session(s) => s.remove(key, options).await,
            StorageBackend::Cookie(s) => s.remove(key, options).await,
            StorageBackend::LegacyCookie(s) => s.remove(key, options).await,
        }
    }
}

impl From<SessionStorage> for StorageBackend {
    fn from(storage: SessionStorage) -> Self {
        StorageBackend::Session(storage)
    }
}

impl From<CookieStorage> for StorageBackend {
    fn from(storage: CookieStorage) -> Self {
        StorageBackend::Cookie(storage)
    }
}

impl From<LegacySameSiteCookieStorage> for StorageBackend {
    fn from(storage: LegacySameSiteCookieStorage) -> Self {
        StorageBackend::LegacyCookie(storage)
    }
}
