use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{Result, VerifyError};

/// Which SQLite consistency check the format gate runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityMode {
    /// `PRAGMA quick_check`: structural scan without index cross-checks.
    #[default]
    Quick,
    /// `PRAGMA integrity_check`: full deep scan.
    Full,
}

pub struct Config {
    pub json_output: bool,
    pub verbose: bool,
    pub integrity: IntegrityMode,
}

/// Optional settings file (~/.config/snap-info/config.toml or platform equivalent).
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub json: Option<bool>,
    pub verbose: Option<bool>,
    pub integrity: Option<IntegrityMode>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| VerifyError::Config(e.to_string()))
    }

    /// Read `path`. When `required` is false a missing file yields the defaults.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text)
                .map_err(|e| VerifyError::Config(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => Ok(Self::default()),
            Err(e) => Err(VerifyError::Config(format!("{}: {e}", path.display()))),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "snap-info")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path, true)?,
            None => match default_config_path() {
                Some(path) => FileConfig::load(&path, false)?,
                None => FileConfig::default(),
            },
        };

        Ok(Self::merge(cli, &file))
    }

    /// Command line flags win over the file; the file wins over built-in defaults.
    pub fn merge(cli: &Cli, file: &FileConfig) -> Self {
        let integrity = if cli.full_check {
            IntegrityMode::Full
        } else {
            file.integrity.unwrap_or_default()
        };

        Config {
            json_output: cli.json || file.json.unwrap_or(false),
            verbose: cli.verbose || file.verbose.unwrap_or(false),
            integrity,
        }
    }

    pub fn default() -> Self {
        Config {
            json_output: false,
            verbose: false,
            integrity: IntegrityMode::Quick,
        }
    }
}
