//! spajs Core
//!
//! Configuration and wiring: turns a `Config` into a transaction manager
//! over the configured storage backend.

mod builder;
mod config;
mod error;

pub use builder::{open_storage, transaction_manager};
pub use config::{CacheLocation, Config};
pub use error::CoreError;

// Re-export core components
pub use spajs_storage::{
    ClientStorage, CookieAttributes, CookieStorage, Database, LegacySameSiteCookieStorage,
    SameSite, SessionStorage, StorageBackend, StorageError, StorageOptions,
};
pub use spajs_transactions::{Transaction, TransactionManager};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
