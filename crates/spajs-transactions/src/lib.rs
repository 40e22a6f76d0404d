//! spajs Transactions
//!
//! Keeps the state of an in-flight authorization flow (nonce, PKCE verifier,
//! caller app state) across the redirect to the identity provider:
//! - One transaction per client id, stored under `a0.spajs.txs.<clientId>`
//! - Writes expire after one day on cookie-backed storage
//! - Storage failures are returned unchanged

mod manager;
mod transaction;

pub use manager::{TransactionManager, TRANSACTION_EXPIRY_DAYS, TRANSACTION_STORAGE_KEY_PREFIX};
pub use spajs_storage::{Result, StorageError};
pub use transaction::Transaction;
