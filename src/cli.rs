use clap::Parser;
use std::path::PathBuf;

use crate::verify::Request;

#[derive(Parser)]
#[command(name = "snap-info")]
#[command(about = "Show and verify a filesystem snapshot database")]
#[command(version)]
pub struct Cli {
    /// Snapshot database to inspect
    pub database: PathBuf,

    /// Recalculate the logical content hash, optionally against an expected HASH
    #[arg(
        short = 's',
        long,
        value_name = "HASH",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = ""
    )]
    pub verify_content: Option<String>,

    /// Verify the database file checksum, optionally against an expected HASH
    #[arg(
        short = 'k',
        long,
        value_name = "HASH",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = ""
    )]
    pub verify_file: Option<String>,

    /// Perform both content and file verification using internal and sidecar hashes
    #[arg(short = 'v', long, default_value_t = false)]
    pub verify: bool,

    /// Output the full report as JSON
    #[arg(short = 'j', long, default_value_t = false)]
    pub json: bool,

    /// Run SQLite's full integrity_check instead of quick_check
    #[arg(long, default_value_t = false)]
    pub full_check: bool,

    /// Show diagnostics on stderr
    #[arg(long, default_value_t = false)]
    pub verbose: bool,

    /// Config file (defaults to ~/.config/snap-info/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn request(&self) -> Request {
        Request {
            content: self.verify_content.is_some(),
            expected_content: non_empty(&self.verify_content),
            file: self.verify_file.is_some(),
            expected_file: non_empty(&self.verify_file),
            all: self.verify,
        }
    }
}

// a bare flag arrives as the empty default_missing_value
fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("snap-info").chain(args.iter().copied()))
    }

    #[test]
    fn bare_flags_request_checks_without_expected_hash() {
        let request = parse(&["snap.db", "-s", "-k"]).request();
        assert!(request.content);
        assert!(request.file);
        assert_eq!(request.expected_content, None);
        assert_eq!(request.expected_file, None);
    }

    #[test]
    fn flag_values_become_external_hashes() {
        let request = parse(&["snap.db", "--verify-content=abc", "-k=def"]).request();
        assert_eq!(request.expected_content.as_deref(), Some("abc"));
        assert_eq!(request.expected_file.as_deref(), Some("def"));
    }

    #[test]
    fn bare_flags_before_database_leave_it_positional() {
        let cli = parse(&["-s", "snap.db"]);
        assert_eq!(cli.database, PathBuf::from("snap.db"));
        assert_eq!(cli.request().expected_content, None);

        let cli = parse(&["-k", "-s", "snap.db"]);
        let request = cli.request();
        assert_eq!(cli.database, PathBuf::from("snap.db"));
        assert!(request.content);
        assert!(request.file);
        assert_eq!(request.expected_content, None);
        assert_eq!(request.expected_file, None);
    }

    #[test]
    fn hash_values_need_an_equals_sign() {
        let result = Cli::try_parse_from(["snap-info", "--verify-content", "abc", "snap.db"]);
        assert!(result.is_err());
    }

    #[test]
    fn verify_requests_everything() {
        let cli = parse(&["-v", "snap.db"]);
        let request = cli.request();
        assert!(request.all);
        assert!(request.wants_content());
        assert!(request.wants_file());
        assert_eq!(cli.database, PathBuf::from("snap.db"));
    }

    #[test]
    fn no_flags_requests_summary_only() {
        let request = parse(&["snap.db"]).request();
        assert!(!request.wants_content());
        assert!(!request.wants_file());
    }
}
