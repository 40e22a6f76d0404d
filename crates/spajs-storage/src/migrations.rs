//! Database migrations
//!
//! The schema version lives in SQLite's `user_version` pragma. Each step
//! runs once, in order, inside its own transaction.

use crate::Result;
use rusqlite::Connection;

const MIGRATIONS: &[(i32, &str, &str)] = &[(1, "Cookie jar", V1_COOKIE_JAR)];

// Empty domain is a host-only cookie. NULL expires_at is a session cookie.
const V1_COOKIE_JAR: &str = r#"
    CREATE TABLE IF NOT EXISTS cookies (
        name TEXT NOT NULL,
        domain TEXT NOT NULL DEFAULT '',
        value TEXT NOT NULL,
        expires_at TEXT,
        secure INTEGER NOT NULL DEFAULT 1,
        same_site TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (name, domain)
    );

    CREATE INDEX IF NOT EXISTS idx_cookies_expires ON cookies(expires_at);
"#;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    for &(version, name, sql) in MIGRATIONS.iter().filter(|(v, _, _)| *v > current) {
        tracing::info!(version, "Running migration: {}", name);

        conn.execute_batch(&format!(
            "BEGIN; {} PRAGMA user_version = {}; COMMIT;",
            sql, version
        ))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_run_once() {
        let conn = Connection::open_in_memory().unwrap();

        run_migrations(&conn).unwrap();
        conn.execute(
            "INSERT INTO cookies (name, value, created_at, updated_at) VALUES ('a', '1', 't', 't')",
            [],
        )
        .unwrap();
        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM cookies", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }
}
