use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, warn};

use super::{canonical, decide, sidecar, SourceCheck, Verification};
use crate::error::Result;
use crate::store::Store;

/// Version marker of the content digest: tables, order keys and row encoding.
/// Digests recorded under any other form do not compare equal.
pub const CANONICAL_FORM: &str = "entries+users+groups/json-v1";

/// Tables fed into the running hash, in this order.
const CANONICAL_QUERIES: [&str; 3] = [
    "SELECT * FROM entries ORDER BY path ASC",
    "SELECT * FROM users ORDER BY uid ASC",
    "SELECT * FROM groups ORDER BY gid ASC",
];

#[derive(Debug, Clone, Serialize)]
pub struct ContentEvidence {
    pub algorithm: &'static str,
    pub computed: Option<String>,
    /// snapshot_info.snapshot_hash
    pub internal: SourceCheck,
    /// `<db>.content.hash`
    pub sidecar: SourceCheck,
    /// supplied on the command line
    pub external: SourceCheck,
}

impl ContentEvidence {
    fn new() -> Self {
        ContentEvidence {
            algorithm: CANONICAL_FORM,
            computed: None,
            internal: SourceCheck::absent(),
            sidecar: SourceCheck::absent(),
            external: SourceCheck::absent(),
        }
    }
}

/// SHA-256 over the canonical encoding of every entries, users and groups row.
///
/// Rows are streamed one at a time, the result set is never held in memory.
pub fn content_hash(store: &Store) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = Vec::with_capacity(512);

    for sql in CANONICAL_QUERIES {
        store.for_each_row(sql, |columns, row| {
            buf.clear();
            canonical::encode_row(&mut buf, columns, row)?;
            hasher.update(&buf);
            Ok(())
        })?;
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Recompute the content digest and compare it with every available source.
pub fn verify_content(store: &Store, db_path: &Path, external: Option<&str>) -> Verification<ContentEvidence> {
    let mut evidence = ContentEvidence::new();
    let outcome = check(store, db_path, external, &mut evidence);

    if let Err(e) = &outcome {
        warn!(error = %e, computed = ?evidence.computed, "content verification failed");
    }

    Verification::from_outcome(evidence, outcome)
}

fn check(store: &Store, db_path: &Path, external: Option<&str>, evidence: &mut ContentEvidence) -> Result<()> {
    let computed = content_hash(store)?;
    debug!(hash = %computed, "computed content hash");

    let mut source_error = None;

    match store.stored_snapshot_hash() {
        Ok(stored) => evidence.internal = SourceCheck::compare(stored.as_deref(), &computed),
        Err(e) => source_error = Some(e),
    }

    match sidecar::read_content_hash(db_path) {
        Ok(found) => evidence.sidecar = SourceCheck::compare(found.as_deref(), &computed),
        Err(e) => {
            source_error.get_or_insert(e);
        }
    }

    evidence.external = SourceCheck::compare(external, &computed);
    evidence.computed = Some(computed);

    decide(
        &[&evidence.internal, &evidence.sidecar, &evidence.external],
        source_error,
        "logical hash mismatch",
    )
}
