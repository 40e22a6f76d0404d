//! Storage and manager construction from `Config`

use spajs_storage::{
    CookieAttributes, CookieStorage, LegacySameSiteCookieStorage, SameSite, SessionStorage,
    StorageBackend,
};
use spajs_transactions::TransactionManager;

use crate::config::{CacheLocation, Config};
use crate::Result;

/// Open the backend named by `config.cache_location`
pub fn open_storage(config: &Config) -> Result<StorageBackend> {
    let backend = match config.cache_location {
        CacheLocation::Session => StorageBackend::from(SessionStorage::new()),
        CacheLocation::Cookie => {
            let cookies = match &config.database_path {
                Some(path) => CookieStorage::open(path)?,
                None => CookieStorage::open_in_memory()?,
            }
            .with_attributes(CookieAttributes {
                secure: config.secure_cookies,
                same_site: Some(SameSite::None),
            });

            if config.legacy_same_site_cookie {
                StorageBackend::from(LegacySameSiteCookieStorage::new(cookies))
            } else {
                StorageBackend::from(cookies)
            }
        }
    };

    tracing::info!(
        client_id = %config.client_id,
        backend = backend.kind(),
        "Opened transaction storage"
    );

    Ok(backend)
}

pub fn transaction_manager(config: &Config) -> Result<TransactionManager<StorageBackend>> {
    config.validate()?;
    let storage = open_storage(config)?;

    Ok(TransactionManager::new(
        storage,
        config.client_id.clone(),
        config.cookie_domain.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use spajs_storage::ClientStorage;
    use spajs_transactions::Transaction;

    fn transaction() -> Transaction {
        Transaction::new("n1", "v1", "openid", "aud1").with_state("s1")
    }

    #[test]
    fn test_open_storage_kinds() {
        let mut config = Config::new("abc123");
        assert_eq!(open_storage(&config).unwrap().kind(), "session");

        config.cache_location = CacheLocation::Cookie;
        assert_eq!(open_storage(&config).unwrap().kind(), "cookie");

        config.legacy_same_site_cookie = true;
        assert_eq!(open_storage(&config).unwrap().kind(), "legacy_cookie");
    }

    #[test]
    fn test_transaction_manager_validates_config() {
        let err = transaction_manager(&Config::new("")).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let manager = transaction_manager(&Config::new("abc123")).unwrap();
        assert_eq!(manager.storage_key(), "a0.spajs.txs.abc123");

        manager.create(&transaction()).await.unwrap();
        assert_eq!(manager.get().await.unwrap(), Some(transaction()));

        manager.remove().await.unwrap();
        assert_eq!(manager.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cookie_transaction_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new("abc123");
        config.cache_location = CacheLocation::Cookie;
        config.cookie_domain = Some("vanity.auth.com".to_string());
        config.database_path = Some(dir.path().join("cookies.db"));

        {
            let manager = transaction_manager(&config).unwrap();
            manager.create(&transaction()).await.unwrap();
        }

        // A new page load after the redirect sees the same transaction
        let manager = transaction_manager(&config).unwrap();
        assert_eq!(manager.get().await.unwrap(), Some(transaction()));
        assert_eq!(manager.cookie_domain(), Some("vanity.auth.com"));

        manager.remove().await.unwrap();
        assert_eq!(manager.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_legacy_cookie_fallback_through_manager() {
        let mut config = Config::new("abc123");
        config.cache_location = CacheLocation::Cookie;
        config.legacy_same_site_cookie = true;

        let manager = transaction_manager(&config).unwrap();
        manager.create(&transaction()).await.unwrap();

        let legacy_key = LegacySameSiteCookieStorage::legacy_key(manager.storage_key());
        match manager.storage() {
            StorageBackend::LegacyCookie(storage) => {
                let inner = storage.inner();
                assert_eq!(
                    inner.get::<Transaction>(&legacy_key).await.unwrap(),
                    Some(transaction())
                );
                inner
                    .remove(manager.storage_key(), &Default::default())
                    .await
                    .unwrap();
            }
            other => panic!("unexpected backend: {}", other.kind()),
        }

        // Modern cookie gone, legacy copy still answers
        assert_eq!(manager.get().await.unwrap(), Some(transaction()));
    }
}
