//! Domain-scoped cookie storage with expiry
//!
//! Cookies are keyed by `(name, domain)`. A cookie written for one domain is
//! only deleted by a remove that names the same domain; a mismatched remove
//! silently leaves it in place, as a browser would.

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::client::{decode, ClientStorage, StorageOptions};
use crate::database::Database;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl std::fmt::Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SameSite {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            _ => Err(format!("Unknown SameSite value: {}", s)),
        }
    }
}

/// Attributes stamped on every cookie a store writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieAttributes {
    pub secure: bool,
    /// `None` omits the attribute entirely
    pub same_site: Option<SameSite>,
}

impl Default for CookieAttributes {
    fn default() -> Self {
        Self {
            secure: true,
            same_site: Some(SameSite::None),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CookieStorage {
    db: Database,
    attributes: CookieAttributes,
}

impl CookieStorage {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            attributes: CookieAttributes::default(),
        }
    }

    /// Open a persistent jar. Session cookies from the previous run are dropped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let storage = Self::new(Database::open(path)?);
        storage.end_session()?;
        Ok(storage)
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    pub fn with_attributes(mut self, attributes: CookieAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn attributes(&self) -> CookieAttributes {
        self.attributes
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Delete cookies whose expiry has passed. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let now = timestamp(Utc::now());
        let removed = self.db.with_connection(|conn| {
            Ok(conn.execute(
                "DELETE FROM cookies WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                [now],
            )?)
        })?;

        if removed > 0 {
            tracing::info!(removed, "Purged expired cookies");
        }

        Ok(removed)
    }

    /// Delete session cookies (no expiry), as when the browser closes
    pub fn end_session(&self) -> Result<usize> {
        let removed = self.db.with_connection(|conn| {
            Ok(conn.execute("DELETE FROM cookies WHERE expires_at IS NULL", [])?)
        })?;

        tracing::debug!(removed, "Dropped session cookies");

        Ok(removed)
    }

    pub(crate) fn write_cookie(
        conn: &Connection,
        name: &str,
        value: &str,
        options: &StorageOptions,
        attributes: CookieAttributes,
    ) -> Result<()> {
        let now = Utc::now();
        let expires_at = options
            .days_until_expire
            .map(|days| timestamp(expiry_after(now, days)));

        // Keep the original creation time when overwriting
        let created_at: Option<String> = conn
            .query_row(
                "SELECT created_at FROM cookies WHERE name = ?1 AND domain = ?2",
                params![name, domain_column(options)],
                |row| row.get(0),
            )
            .optional()?;

        conn.execute(
            "INSERT OR REPLACE INTO cookies
             (name, domain, value, expires_at, secure, same_site, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                name,
                domain_column(options),
                value,
                expires_at,
                attributes.secure as i32,
                attributes.same_site.map(|s| s.as_str()),
                created_at.unwrap_or_else(|| timestamp(now)),
                timestamp(now),
            ],
        )?;

        tracing::debug!(
            name = %name,
            domain = ?options.cookie_domain,
            expires_at = ?expires_at,
            "Wrote cookie"
        );

        Ok(())
    }

    /// Latest unexpired raw value for `name`, across domains
    pub(crate) fn read_cookie(conn: &Connection, name: &str) -> Result<Option<String>> {
        let mut stmt = conn.prepare(
            "SELECT value, expires_at FROM cookies WHERE name = ?1
             ORDER BY updated_at DESC, rowid DESC",
        )?;

        let now = Utc::now();
        let rows: Vec<(String, Option<String>)> = stmt
            .query_map([name], |row| Ok((row.get(0)?, row.get(1)?)))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(rows
            .into_iter()
            .find(|(_, expires_at)| match expires_at {
                None => true,
                Some(s) => DateTime::parse_from_rfc3339(s)
                    .map(|dt| dt.with_timezone(&Utc) > now)
                    .unwrap_or(false),
            })
            .map(|(value, _)| value))
    }

    pub(crate) fn delete_cookie(
        conn: &Connection,
        name: &str,
        options: &StorageOptions,
    ) -> Result<()> {
        let removed = conn.execute(
            "DELETE FROM cookies WHERE name = ?1 AND domain = ?2",
            params![name, domain_column(options)],
        )?;

        if removed == 0 {
            tracing::debug!(
                name = %name,
                domain = ?options.cookie_domain,
                "No cookie matched name and domain"
            );
        }

        Ok(())
    }
}

impl ClientStorage for CookieStorage {
    async fn save<T>(&self, key: &str, value: &T, options: &StorageOptions) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let json = serde_json::to_string(value)?;
        self.db
            .with_connection(|conn| Self::write_cookie(conn, key, &json, options, self.attributes))
    }

    async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        let raw = self.db.with_connection(|conn| Self::read_cookie(conn, key))?;
        Ok(raw.and_then(|raw| decode(key, &raw)))
    }

    async fn remove(&self, key: &str, options: &StorageOptions) -> Result<()> {
        self.db
            .with_connection(|conn| Self::delete_cookie(conn, key, options))
    }
}

/// `now + days`, capped at the end of year 9999 so the stored text keeps
/// its fixed width and still parses as RFC 3339
fn expiry_after(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    let latest = Utc
        .with_ymd_and_hms(9999, 12, 31, 23, 59, 59)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    Duration::try_days(i64::from(days))
        .and_then(|delta| now.checked_add_signed(delta))
        .map_or(latest, |expiry| expiry.min(latest))
}

fn domain_column(options: &StorageOptions) -> &str {
    options.cookie_domain.as_deref().unwrap_or("")
}

/// Fixed-width RFC 3339 so stored timestamps sort as text
fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}
