//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::Result;

/// Where transactions are kept between the redirect and the callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheLocation {
    /// Tab-scoped, lost when the session ends
    #[default]
    Session,
    /// Domain-scoped cookie jar with expiry
    Cookie,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Identity provider client id; namespaces the storage key
    pub client_id: String,
    /// Domain cookies are written to and deleted from
    #[serde(default)]
    pub cookie_domain: Option<String>,
    #[serde(default)]
    pub cache_location: CacheLocation,
    /// Cookie jar file. In memory when unset.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Also write `_legacy_` cookies without a SameSite attribute
    #[serde(default)]
    pub legacy_same_site_cookie: bool,
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_secure_cookies() -> bool {
    true
}

impl Config {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            cookie_domain: None,
            cache_location: CacheLocation::default(),
            database_path: None,
            legacy_same_site_cookie: false,
            secure_cookies: default_secure_cookies(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;

        tracing::debug!(path = %path.as_ref().display(), "Loaded configuration file");

        Self::from_json(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(CoreError::Config("client_id cannot be empty".to_string()));
        }
        Ok(())
    }
}
