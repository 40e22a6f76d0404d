//! spajs Storage Layer
//!
//! Client-side stores for state that has to survive a redirect to the
//! identity provider and back:
//! - `SessionStorage`: tab-scoped, gone when the session ends
//! - `CookieStorage`: domain-scoped cookie jar with expiry (SQLite)
//! - `LegacySameSiteCookieStorage`: cookie jar plus a `_legacy_` fallback
//!   for user agents that reject `SameSite=None`

mod backend;
mod client;
mod cookie;
mod database;
mod error;
mod legacy;
mod migrations;
mod session;

pub use backend::StorageBackend;
pub use client::{ClientStorage, StorageOptions};
pub use cookie::{CookieAttributes, CookieStorage, SameSite};
pub use database::Database;
pub use error::StorageError;
pub use legacy::{LegacySameSiteCookieStorage, LEGACY_KEY_PREFIX};
pub use session::SessionStorage;

pub type Result<T> = std::result::Result<T, StorageError>;
