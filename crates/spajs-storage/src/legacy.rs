//! Cookie storage with a legacy SameSite fallback
//!
//! Some user agents reject cookies marked `SameSite=None`. Every write also
//! stores a `_legacy_` copy without the attribute, and reads fall back to it.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{decode, ClientStorage, StorageOptions};
use crate::cookie::{CookieAttributes, CookieStorage};
use crate::Result;

pub const LEGACY_KEY_PREFIX: &str = "_legacy_";

#[derive(Debug, Clone)]
pub struct LegacySameSiteCookieStorage {
    inner: CookieStorage,
}

impl LegacySameSiteCookieStorage {
    pub fn new(inner: CookieStorage) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &CookieStorage {
        &self.inner
    }

    pub fn legacy_key(key: &str) -> String {
        format!("{}{}", LEGACY_KEY_PREFIX, key)
    }
}

impl ClientStorage for LegacySameSiteCookieStorage {
    async fn save<T>(&self, key: &str, value: &T, options: &StorageOptions) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let json = serde_json::to_string(value)?;
        let attributes = self.inner.attributes();
        let legacy_attributes = CookieAttributes {
            same_site: None,
            ..attributes
        };

        self.inner.database().transaction(|conn| {
            CookieStorage::write_cookie(conn, key, &json, options, attributes)?;
            CookieStorage::write_cookie(
                conn,
                &Self::legacy_key(key),
                &json,
                options,
                legacy_attributes,
            )
        })
    }

    async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        let legacy_key = Self::legacy_key(key);
        let (modern, legacy) = self.inner.database().with_connection(|conn| {
            Ok((
                CookieStorage::read_cookie(conn, key)?,
                CookieStorage::read_cookie(conn, &legacy_key)?,
            ))
        })?;

        // An unreadable modern cookie falls back the same as a missing one
        Ok(modern
            .and_then(|raw| decode(key, &raw))
            .or_else(|| legacy.and_then(|raw| decode(&legacy_key, &raw))))
    }

    async fn remove(&self, key: &str, options: &StorageOptions) -> Result<()> {
        self.inner.database().transaction(|conn| {
            CookieStorage::delete_cookie(conn, key, options)?;
            CookieStorage::delete_cookie(conn, &Self::legacy_key(key), options)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::SameSite;

    fn storage() -> LegacySameSiteCookieStorage {
        LegacySameSiteCookieStorage::new(CookieStorage::open_in_memory().unwrap())
    }

    fn same_site_of(storage: &LegacySameSiteCookieStorage, name: &str) -> Option<String> {
        storage
            .inner()
            .database()
            .with_connection(|conn| {
                Ok(conn.query_row(
                    "SELECT same_site FROM cookies WHERE name = ?1",
                    [name],
                    |row| row.get(0),
                )?)
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_save_writes_both_cookies() {
        let storage = storage();
        storage
            .save("tx", &7u32, &StorageOptions::expiring_in(1))
            .await
            .unwrap();

        assert_eq!(storage.inner().get::<u32>("tx").await.unwrap(), Some(7));
        assert_eq!(
            storage.inner().get::<u32>("_legacy_tx").await.unwrap(),
            Some(7)
        );
        assert_eq!(
            same_site_of(&storage, "tx").as_deref(),
            Some(SameSite::None.as_str())
        );
        assert_eq!(same_site_of(&storage, "_legacy_tx"), None);
    }

    #[tokio::test]
    async fn test_get_falls_back_to_legacy() {
        let storage = storage();
        storage
            .inner()
            .save("_legacy_tx", &3u32, &StorageOptions::expiring_in(1))
            .await
            .unwrap();

        assert_eq!(storage.get::<u32>("tx").await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_modern_cookie_wins_over_legacy() {
        let storage = storage();
        let options = StorageOptions::expiring_in(1);
        storage.inner().save("tx", &1u32, &options).await.unwrap();
        storage.inner().save("_legacy_tx", &2u32, &options).await.unwrap();

        assert_eq!(storage.get::<u32>("tx").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_malformed_modern_cookie_falls_back_to_legacy() {
        let storage = storage();
        let options = StorageOptions::expiring_in(1);
        storage
            .inner()
            .database()
            .with_connection(|conn| {
                CookieStorage::write_cookie(
                    conn,
                    "tx",
                    "{broken",
                    &options,
                    CookieAttributes::default(),
                )
            })
            .unwrap();
        storage.inner().save("_legacy_tx", &4u32, &options).await.unwrap();

        assert_eq!(storage.get::<u32>("tx").await.unwrap(), Some(4));
    }

    #[tokio::test]
    async fn test_remove_deletes_both_for_domain() {
        let storage = storage();
        let options =
            StorageOptions::expiring_in(1).with_cookie_domain(Some("auth.example.com".into()));
        storage.save("tx", &1u32, &options).await.unwrap();

        storage
            .remove("tx", &StorageOptions::default())
            .await
            .unwrap();
        assert_eq!(storage.get::<u32>("tx").await.unwrap(), Some(1));

        storage.remove("tx", &options).await.unwrap();
        assert_eq!(storage.get::<u32>("tx").await.unwrap(), None);
        assert_eq!(
            storage.inner().get::<u32>("_legacy_tx").await.unwrap(),
            None
        );
    }
}
