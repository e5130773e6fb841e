//! SQLite schema for diplomas, their files and audit logs.
//!
//! Versions apply in order inside one transaction; `schema_migrations`
//! records which have run.

use chrono::Utc;
use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Bring the schema up to [`CURRENT_VERSION`]. Safe to call on every open.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, Utc::now().timestamp_millis()],
            )?;
            tracing::debug!(version, "applied schema migration");
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
        -- One row per diploma; serial_no is immutable
        CREATE TABLE diplomas (
            serial_no TEXT PRIMARY KEY,
            student_id TEXT,
            student_name TEXT,
            birth_date TEXT,                  -- YYYY-MM-DD
            major TEXT,
            ranking TEXT,
            gpa_hundredths INTEGER,           -- 380 for 3.80
            graduation_year INTEGER,
            status TEXT NOT NULL,
            created_by TEXT NOT NULL,
            created_at INTEGER NOT NULL,      -- Unix ms
            updated_at INTEGER NOT NULL,
            approved_by TEXT,
            approved_at INTEGER,
            issued_by TEXT,
            issued_at INTEGER,
            revoked_by TEXT,
            revoked_at INTEGER
        );

        -- Attachments, at most one per kind
        CREATE TABLE diploma_files (
            serial_no TEXT NOT NULL REFERENCES diplomas(serial_no),
            kind TEXT NOT NULL,               -- PORTRAIT, DIPLOMA, TRANSCRIPT
            filename TEXT NOT NULL,
            mime_type TEXT NOT NULL,
            data BLOB NOT NULL,
            uploaded_at INTEGER NOT NULL,
            PRIMARY KEY (serial_no, kind)
        );

        -- Workflow audit trail
        CREATE TABLE approval_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            serial_no TEXT NOT NULL REFERENCES diplomas(serial_no),
            action TEXT NOT NULL,
            from_status TEXT NOT NULL,
            to_status TEXT NOT NULL,
            actor TEXT NOT NULL,
            note TEXT,
            at INTEGER NOT NULL
        );

        -- Ledger transactions committed for a diploma
        CREATE TABLE chain_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            serial_no TEXT NOT NULL REFERENCES diplomas(serial_no),
            action TEXT NOT NULL,             -- ISSUE, REVOKE
            actor TEXT NOT NULL,
            tx_id TEXT NOT NULL,
            record_hash TEXT,                 -- 64 hex
            onchain_status TEXT NOT NULL,
            at INTEGER NOT NULL
        );

        CREATE INDEX idx_diplomas_status ON diplomas(status);
        CREATE INDEX idx_diplomas_created ON diplomas(created_at);
        CREATE INDEX idx_approval_logs_serial ON approval_logs(serial_no);
        CREATE INDEX idx_chain_logs_serial ON chain_logs(serial_no);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        for table in [
            "diplomas",
            "diploma_files",
            "approval_logs",
            "chain_logs",
            "schema_migrations",
        ] {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn test_newer_schema_rejected() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (99, 0)",
            [],
        )
        .unwrap();
        assert!(matches!(migrate(&mut conn), Err(StoreError::Migration(_))));
    }
}
