//! Read-only access to a snapshot database.
//!
//! The snapshot file is produced elsewhere; this module never writes to it.
//! Tables the verifiers rely on:
//! - snapshot_info: one row of scan metadata including the stored content hash
//! - entries: one row per scanned filesystem object, keyed by path
//! - users / groups: resolved identities, keyed by uid / gid
//!
//! Supports:
//! - SQLite's built-in structural checks (quick or full)
//! - Schema introspection per table
//! - Streaming row iteration for hashing

pub mod snapshot;

use rusqlite::{Connection, OpenFlags, Row};
use std::path::Path;

use crate::config::IntegrityMode;
use crate::error::Result;

pub use snapshot::Summary;

/// Database handle. Opened read-only once per invocation, closed on drop.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Store { conn })
    }

    /// Run SQLite's consistency check and return the reported lines.
    /// A clean database reports exactly `["ok"]`.
    pub fn integrity_check(&self, mode: IntegrityMode) -> Result<Vec<String>> {
        let sql = match mode {
            IntegrityMode::Quick => "PRAGMA quick_check",
            IntegrityMode::Full => "PRAGMA integrity_check",
        };

        let mut stmt = self.conn.prepare(sql)?;
        let lines = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(lines)
    }

    /// Column names of `table` in declaration order, empty if the table does not exist.
    pub fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;

        let columns = stmt
            .query_map([table], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(columns)
    }

    /// The content hash recorded by the snapshot producer, if any.
    pub fn stored_snapshot_hash(&self) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT snapshot_hash FROM snapshot_info LIMIT 1")?;
        let mut rows = stmt.query([])?;

        let stored = match rows.next()? {
            Some(row) => row.get::<_, Option<String>>(0)?,
            None => None,
        };

        Ok(stored.filter(|h| !h.trim().is_empty()))
    }

    /// Stream every row of `sql` through `f` without collecting the result set.
    /// `f` receives the statement's column names alongside each row.
    pub fn for_each_row<F>(&self, sql: &str, mut f: F) -> Result<()>
    where
        F: FnMut(&[String], &Row<'_>) -> Result<()>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            f(&columns, row)?;
        }

        Ok(())
    }

    pub fn count_rows(&self, table: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", table.replace('"', "\"\""));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e)?;
        Ok(())
    }
}
