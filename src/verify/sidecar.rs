//! Trusted hashes stored next to the snapshot file.
//!
//! - `<db>.content.hash`: first non-blank line not starting with `#`
//! - `<db>.sha256`: first whitespace-delimited token of the first line, as
//!   written by `sha256sum`

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Result, VerifyError};

pub const CONTENT_SUFFIX: &str = ".content.hash";
pub const FILE_SUFFIX: &str = ".sha256";

fn with_suffix(db_path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(db_path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

pub fn content_sidecar_path(db_path: &Path) -> PathBuf {
    with_suffix(db_path, CONTENT_SUFFIX)
}

pub fn file_sidecar_path(db_path: &Path) -> PathBuf {
    with_suffix(db_path, FILE_SUFFIX)
}

pub fn parse_content_hash(text: &str) -> Option<&str> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
}

/// First token of the first line, `sha256sum` style.
///
/// A leading `\` marks an escaped file name and is not part of the digest.
pub fn parse_checksum_line(text: &str) -> Option<&str> {
    let token = text.lines().next()?.split_whitespace().next()?;
    let digest = token.strip_prefix('\\').unwrap_or(token);
    (!digest.is_empty()).then_some(digest)
}

/// `Ok(None)` when the sidecar does not exist.
pub fn read_content_hash(db_path: &Path) -> Result<Option<String>> {
    read_with(&content_sidecar_path(db_path), parse_content_hash, "no hash line")
}

/// `Ok(None)` when the sidecar does not exist.
pub fn read_checksum(db_path: &Path) -> Result<Option<String>> {
    read_with(&file_sidecar_path(db_path), parse_checksum_line, "empty first line")
}

fn read_with(path: &Path, parse: fn(&str) -> Option<&str>, reason: &'static str) -> Result<Option<String>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    match parse(&text) {
        Some(hash) => Ok(Some(hash.to_string())),
        None => Err(VerifyError::Malformed {
            path: path.to_path_buf(),
            reason,
        }),
    }
}
