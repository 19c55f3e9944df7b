use serde::Serialize;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::{debug, warn};

use super::Verification;
use crate::config::IntegrityMode;
use crate::error::{Result, VerifyError};
use crate::store::Store;

pub const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// Tables and columns every snapshot must have.
pub const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("snapshot_info", &["version", "snapshot_hash", "root_path"]),
    ("entries", &["path", "hash", "type", "size"]),
    ("users", &["uid"]),
    ("groups", &["gid"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gate {
    Header,
    Integrity,
    Schema,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FormatEvidence {
    pub header_ok: bool,
    pub integrity_ok: bool,
    pub schema_ok: bool,
    pub failed_gate: Option<Gate>,
}

/// Decide whether `path` is safe to open as a snapshot store.
///
/// Gates run in order and stop at the first failure: magic header, SQLite's
/// own consistency check, required schema. Nothing here trusts the file
/// extension or an earlier run.
pub fn verify_format(path: &Path, mode: IntegrityMode) -> Verification<FormatEvidence> {
    let mut evidence = FormatEvidence::default();
    let outcome = check(path, mode, &mut evidence);

    match &outcome {
        Ok(()) => debug!(path = %path.display(), "format ok"),
        Err(e) => {
            evidence.failed_gate = Some(evidence.next_gate());
            warn!(path = %path.display(), gate = ?evidence.failed_gate, error = %e, "format verification failed");
        }
    }

    Verification::from_outcome(evidence, outcome)
}

impl FormatEvidence {
    fn next_gate(&self) -> Gate {
        if !self.header_ok {
            Gate::Header
        } else if !self.integrity_ok {
            Gate::Integrity
        } else {
            Gate::Schema
        }
    }
}

fn check(path: &Path, mode: IntegrityMode, evidence: &mut FormatEvidence) -> Result<()> {
    check_header(path)?;
    evidence.header_ok = true;

    // a file with a valid header can still be refused by SQLite itself
    let store = Store::open_read_only(path).map_err(|e| VerifyError::Corruption(e.to_string()))?;
    check_integrity(&store, mode)?;
    evidence.integrity_ok = true;

    check_schema(&store)?;
    evidence.schema_ok = true;

    store.close()
}

pub fn check_header(path: &Path) -> Result<()> {
    let mut header = [0u8; 16];
    let mut file = File::open(path)?;

    match file.read_exact(&mut header) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
            return Err(VerifyError::InvalidFormat("file is shorter than the SQLite header".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    if &header != SQLITE_MAGIC {
        return Err(VerifyError::InvalidFormat("missing SQLite format 3 header".to_string()));
    }

    Ok(())
}

fn check_integrity(store: &Store, mode: IntegrityMode) -> Result<()> {
    let lines = store
        .integrity_check(mode)
        .map_err(|e| VerifyError::Corruption(e.to_string()))?;

    if lines.len() == 1 && lines[0] == "ok" {
        return Ok(());
    }

    if lines.is_empty() {
        return Err(VerifyError::Corruption("integrity check returned no result".to_string()));
    }
    Err(VerifyError::Corruption(lines.join("; ")))
}

/// Reports every missing table and column, not only the first.
fn check_schema(store: &Store) -> Result<()> {
    let mut missing = Vec::new();

    for (table, required) in REQUIRED_SCHEMA {
        let columns = store.table_columns(table)?;
        if columns.is_empty() {
            missing.push(format!("table {table}"));
            continue;
        }

        for column in required.iter() {
            if !columns.iter().any(|c| c == column) {
                missing.push(format!("column {table}.{column}"));
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(VerifyError::SchemaMismatch(missing.join(", ")))
    }
}
