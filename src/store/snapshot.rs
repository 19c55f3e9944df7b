use rusqlite::types::ValueRef;
use rusqlite::Row;
use serde::Serialize;

use super::Store;
use crate::error::Result;

/// Scan metadata stored in snapshot_info, plus identity counts.
///
/// Every field is optional: producers of older snapshots did not write all
/// of these columns and the summary is informational only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub version: Option<String>,
    pub root_path: Option<String>,
    /// Epoch milliseconds.
    pub scan_start: Option<i64>,
    /// Epoch milliseconds.
    pub scan_end: Option<i64>,
    pub time_zone: Option<String>,
    pub os_platform: Option<String>,
    pub total_entries: Option<i64>,
    pub total_files: Option<i64>,
    pub total_dirs: Option<i64>,
    pub total_links: Option<i64>,
    pub total_size: Option<i64>,
    pub total_errors: Option<i64>,
    pub snapshot_hash: Option<String>,
    pub user_count: u64,
    pub group_count: u64,
}

impl Summary {
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.scan_start, self.scan_end) {
            (Some(start), Some(end)) => Some(end.saturating_sub(start)),
            _ => None,
        }
    }
}

impl Store {
    /// Load the summary, or `None` if snapshot_info has no row.
    pub fn summary(&self) -> Result<Option<Summary>> {
        let mut summary = None;

        self.for_each_row("SELECT * FROM snapshot_info LIMIT 1", |columns, row| {
            let value = |name: &str| column(columns, row, name);

            summary = Some(Summary {
                version: as_text(value("version")?),
                root_path: as_text(value("root_path")?),
                scan_start: as_int(value("scan_start")?),
                scan_end: as_int(value("scan_end")?),
                time_zone: as_text(value("time_zone")?),
                os_platform: as_text(value("os_platform")?),
                total_entries: as_int(value("total_entries")?),
                total_files: as_int(value("total_files")?),
                total_dirs: as_int(value("total_dirs")?),
                total_links: as_int(value("total_links")?),
                total_size: as_int(value("total_size")?),
                total_errors: as_int(value("total_errors")?),
                snapshot_hash: as_text(value("snapshot_hash")?).filter(|h| !h.trim().is_empty()),
                user_count: 0,
                group_count: 0,
            });
            Ok(())
        })?;

        let Some(mut summary) = summary else {
            return Ok(None);
        };

        summary.user_count = self.count_rows("users")?;
        summary.group_count = self.count_rows("groups")?;

        Ok(Some(summary))
    }
}

fn column<'r>(columns: &[String], row: &'r Row<'_>, name: &str) -> rusqlite::Result<ValueRef<'r>> {
    match columns.iter().position(|c| c == name) {
        Some(idx) => row.get_ref(idx),
        None => Ok(ValueRef::Null),
    }
}

fn as_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    }
}

// producers have stored timestamps both as integers and as numeric text
fn as_int(value: ValueRef<'_>) -> Option<i64> {
    match value {
        ValueRef::Integer(i) => Some(i),
        ValueRef::Real(f) if f.is_finite() => Some(f as i64),
        ValueRef::Text(t) => {
            let s = std::str::from_utf8(t).ok()?.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}
