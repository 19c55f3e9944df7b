//! Snapshot verification pipeline.
//!
//! Runs up to three independent checks against one snapshot file:
//! - format: SQLite header, built-in consistency check, required schema
//! - content: canonical hash over the rows vs. stored/sidecar/caller hashes
//! - file: raw file checksum vs. sidecar/caller hashes
//!
//! The format check is a gate. When it fails the store is never opened and the
//! report carries nothing else. Content and file failures are local to their
//! own result and never stop the other check.

pub mod canonical;
pub mod content;
pub mod file;
pub mod format;
pub mod sidecar;

use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{FailureKind, Result, VerifyError};
use crate::store::{Store, Summary};

pub use content::ContentEvidence;
pub use file::FileEvidence;
pub use format::{FormatEvidence, Gate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&VerifyError> for Failure {
    fn from(err: &VerifyError) -> Self {
        Failure {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Outcome of one check. Built once, read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Verification<E> {
    status: Status,
    evidence: E,
    failure: Option<Failure>,
}

impl<E> Verification<E> {
    pub fn success(evidence: E) -> Self {
        Verification {
            status: Status::Success,
            evidence,
            failure: None,
        }
    }

    pub fn failed(evidence: E, err: &VerifyError) -> Self {
        Verification {
            status: Status::Failed,
            evidence,
            failure: Some(Failure::from(err)),
        }
    }

    fn from_outcome(evidence: E, outcome: Result<()>) -> Self {
        match outcome {
            Ok(()) => Self::success(evidence),
            Err(e) => Self::failed(evidence, &e),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn passed(&self) -> bool {
        self.status == Status::Success
    }

    pub fn evidence(&self) -> &E {
        &self.evidence
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceState {
    Match,
    Mismatch,
    Absent,
}

/// One trusted hash source and how it compared to the computed digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCheck {
    pub expected: Option<String>,
    pub state: SourceState,
}

impl SourceCheck {
    pub fn absent() -> Self {
        SourceCheck {
            expected: None,
            state: SourceState::Absent,
        }
    }

    /// Hex digests compare with surrounding whitespace trimmed and ASCII case ignored.
    pub fn compare(expected: Option<&str>, computed: &str) -> Self {
        let Some(expected) = expected.map(str::trim).filter(|e| !e.is_empty()) else {
            return Self::absent();
        };

        let state = if expected.eq_ignore_ascii_case(computed.trim()) {
            SourceState::Match
        } else {
            SourceState::Mismatch
        };

        SourceCheck {
            expected: Some(expected.to_string()),
            state,
        }
    }

    pub fn is_mismatch(&self) -> bool {
        self.state == SourceState::Mismatch
    }
}

/// Decide a content or file check from its compared sources.
///
/// Any mismatch fails, whatever the others say. A source that could not be
/// read fails next. With nothing to compare against the check fails too.
fn decide(sources: &[&SourceCheck], source_error: Option<VerifyError>, mismatch: &'static str) -> Result<()> {
    if sources.iter().any(|s| s.is_mismatch()) {
        return Err(VerifyError::HashMismatch(mismatch));
    }
    if let Some(err) = source_error {
        return Err(err);
    }
    if sources.iter().all(|s| s.state == SourceState::Absent) {
        return Err(VerifyError::NoVerificationSource);
    }
    Ok(())
}

/// Which checks the caller asked for.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub content: bool,
    pub expected_content: Option<String>,
    pub file: bool,
    pub expected_file: Option<String>,
    /// Both checks against internal and sidecar sources.
    pub all: bool,
}

impl Request {
    pub fn wants_content(&self) -> bool {
        self.content || self.all || self.expected_content.is_some()
    }

    pub fn wants_file(&self) -> bool {
        self.file || self.all || self.expected_file.is_some()
    }
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub name: String,
    pub format: Verification<FormatEvidence>,
    pub summary: Option<Summary>,
    #[serde(rename = "verify_content")]
    pub content: Option<Verification<ContentEvidence>>,
    #[serde(rename = "verify_file")]
    pub file: Option<Verification<FileEvidence>>,
}

impl Report {
    /// True when every check that ran succeeded.
    pub fn passed(&self) -> bool {
        self.format.passed()
            && self.content.as_ref().map_or(true, Verification::passed)
            && self.file.as_ref().map_or(true, Verification::passed)
    }
}

/// Verify one snapshot file.
///
/// Returns `Err` only for failures outside the three checks (opening the
/// verified store, reading its summary). The store is closed on every path.
pub fn run(path: &Path, request: &Request, config: &Config) -> Result<Report> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let format = format::verify_format(path, config.integrity);
    if !format.passed() {
        return Ok(Report {
            name,
            format,
            summary: None,
            content: None,
            file: None,
        });
    }

    let store = Store::open_read_only(path)?;
    let summary = store.summary()?;
    if summary.is_none() {
        warn!(path = %path.display(), "snapshot_info has no row");
    }

    let content = request.wants_content().then(|| {
        debug!("verifying logical content");
        content::verify_content(&store, path, request.expected_content.as_deref())
    });

    let file = request.wants_file().then(|| {
        debug!("verifying file checksum");
        file::verify_file(path, request.expected_file.as_deref())
    });

    if let Err(e) = store.close() {
        warn!(error = %e, "failed to close snapshot database");
    }

    Ok(Report {
        name,
        format,
        summary,
        content,
        file,
    })
}
