//! Database schema migrations for SQLite.
//!
//! Simple versioned migration system: each migration is a SQL batch that
//! transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// Idempotent - safe to call on every open.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Archive records. The owner and content locator never change
        -- after insert; the registry enforces that above this layer.
        CREATE TABLE archives (
            id INTEGER PRIMARY KEY,           -- registry-assigned, never reused
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            content TEXT NOT NULL,            -- opaque content locator
            category TEXT NOT NULL,           -- '' = uncategorized
            location TEXT NOT NULL,
            year INTEGER NOT NULL,
            owner TEXT NOT NULL,              -- opaque identity token
            created_at INTEGER NOT NULL,      -- Unix ms
            visibility INTEGER NOT NULL,      -- 0=public, 1=private
            tags BLOB NOT NULL                -- CBOR array of strings
        );

        -- Per-archive capability grants. Empty sets are never stored.
        CREATE TABLE grants (
            archive_id INTEGER NOT NULL REFERENCES archives(id) ON DELETE CASCADE,
            grantee TEXT NOT NULL,
            capabilities INTEGER NOT NULL,    -- 3-bit mask
            PRIMARY KEY (archive_id, grantee)
        );

        -- Monotonic id counter. Invariant: value >= max(archives.id) + 1.
        CREATE TABLE registry_meta (
            key TEXT PRIMARY KEY,
            value INTEGER NOT NULL
        );
        INSERT INTO registry_meta (key, value) VALUES ('next_id', 1);

        -- Indexes for the query surface
        CREATE INDEX idx_archives_owner ON archives(owner);
        CREATE INDEX idx_archives_category ON archives(category);
        CREATE INDEX idx_archives_created ON archives(created_at);
        "#,
    )?;

    Ok(())
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
