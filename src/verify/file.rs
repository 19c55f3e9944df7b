use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use tracing::{debug, warn};

use super::{decide, sidecar, SourceCheck, Verification};
use crate::error::Result;

const READ_BUF_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Serialize)]
pub struct FileEvidence {
    pub algorithm: &'static str,
    pub computed: Option<String>,
    /// `<db>.sha256`
    pub sidecar: SourceCheck,
    /// supplied on the command line
    pub external: SourceCheck,
}

impl FileEvidence {
    fn new() -> Self {
        FileEvidence {
            algorithm: "sha256",
            computed: None,
            sidecar: SourceCheck::absent(),
            external: SourceCheck::absent(),
        }
    }
}

/// SHA-256 of the file's bytes, read through a fixed-size buffer.
pub fn file_hash(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(READ_BUF_SIZE, file);
    let mut hasher = Sha256::new();

    io::copy(&mut reader, &mut hasher)?;

    Ok(hex::encode(hasher.finalize()))
}

/// Hash the snapshot file and compare it with the sidecar checksum and the caller's hash.
pub fn verify_file(db_path: &Path, external: Option<&str>) -> Verification<FileEvidence> {
    let mut evidence = FileEvidence::new();
    let outcome = check(db_path, external, &mut evidence);

    if let Err(e) = &outcome {
        warn!(error = %e, computed = ?evidence.computed, "file verification failed");
    }

    Verification::from_outcome(evidence, outcome)
}

fn check(db_path: &Path, external: Option<&str>, evidence: &mut FileEvidence) -> Result<()> {
    let computed = file_hash(db_path)?;
    debug!(hash = %computed, "computed file checksum");

    let mut source_error = None;

    match sidecar::read_checksum(db_path) {
        Ok(found) => evidence.sidecar = SourceCheck::compare(found.as_deref(), &computed),
        Err(e) => source_error = Some(e),
    }

    evidence.external = SourceCheck::compare(external, &computed);
    evidence.computed = Some(computed);

    decide(&[&evidence.sidecar, &evidence.external], source_error, "file checksum mismatch")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::verify::{SourceState, Status};
    use tempfile::TempDir;

    // sha256("hello world")
    const HELLO: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    fn write_db(dir: &TempDir, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("snap.db");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn hashes_known_content() {
        let dir = TempDir::new().unwrap();
        let path = write_db(&dir, b"hello world");
        assert_eq!(file_hash(&path).unwrap(), HELLO);
    }

    #[test]
    fn hashes_files_larger_than_the_buffer() {
        let dir = TempDir::new().unwrap();
        let data = vec![7u8; READ_BUF_SIZE * 3 + 17];
        let path = write_db(&dir, &data);
        assert_eq!(file_hash(&path).unwrap(), hex::encode(Sha256::digest(&data)));
    }

    #[test]
    fn escaped_name_sidecar_passes() {
        let dir = TempDir::new().unwrap();
        let path = write_db(&dir, b"hello world");
        std::fs::write(sidecar::file_sidecar_path(&path), format!("\\{HELLO}  back\\\\slash.db\n")).unwrap();

        let result = verify_file(&path, None);
        assert!(result.passed());
        assert_eq!(result.evidence().sidecar.state, SourceState::Match);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        assert!(file_hash(&dir.path().join("gone.db")).is_err());

        let result = verify_file(&dir.path().join("gone.db"), Some(HELLO));
        assert_eq!(result.status(), Status::Failed);
        assert_eq!(result.failure().unwrap().kind, FailureKind::Io);
        assert_eq!(result.evidence().computed, None);
    }

    #[test]
    fn sidecar_match_passes() {
        let dir = TempDir::new().unwrap();
        let path = write_db(&dir, b"hello world");
        std::fs::write(sidecar::file_sidecar_path(&path), format!("{HELLO}  snap.db\n")).unwrap();

        let result = verify_file(&path, None);
        assert!(result.passed());
        assert_eq!(result.evidence().sidecar.state, SourceState::Match);
        assert_eq!(result.evidence().external.state, SourceState::Absent);
    }

    #[test]
    fn external_mismatch_fails_despite_sidecar_match() {
        let dir = TempDir::new().unwrap();
        let path = write_db(&dir, b"hello world");
        std::fs::write(sidecar::file_sidecar_path(&path), format!("{HELLO}  snap.db\n")).unwrap();

        let result = verify_file(&path, Some("0000"));
        assert_eq!(result.status(), Status::Failed);
        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::HashMismatch);
        assert_eq!(failure.message, "file checksum mismatch");
        assert_eq!(result.evidence().sidecar.state, SourceState::Match);
        assert_eq!(result.evidence().external.state, SourceState::Mismatch);
    }

    #[test]
    fn no_sources_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_db(&dir, b"hello world");

        let result = verify_file(&path, None);
        assert_eq!(result.failure().unwrap().kind, FailureKind::NoVerificationSource);
        assert_eq!(result.evidence().computed.as_deref(), Some(HELLO));
    }

    #[test]
    fn malformed_sidecar_fails_with_io() {
        let dir = TempDir::new().unwrap();
        let path = write_db(&dir, b"hello world");
        std::fs::write(sidecar::file_sidecar_path(&path), "\n").unwrap();

        let result = verify_file(&path, Some(HELLO));
        assert_eq!(result.failure().unwrap().kind, FailureKind::Io);
        assert_eq!(result.evidence().external.state, SourceState::Match);
    }
}
