use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cli::Cli;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// [export] section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory "save to file" writes reports into.
    #[serde(default = "default_export_dir")]
    pub directory: PathBuf,
}

/// [display] section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub syntax_highlighting: bool,
    #[serde(default = "default_status_timeout")]
    pub status_timeout_secs: u64,
    #[serde(default = "default_comment_char_limit")]
    pub comment_char_limit: usize,
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

fn default_status_timeout() -> u64 {
    3
}

fn default_comment_char_limit() -> usize {
    200
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_dir(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            syntax_highlighting: true,
            status_timeout_secs: default_status_timeout(),
            comment_char_limit: default_comment_char_limit(),
        }
    }
}

/// `~/.config/diff-review/config.toml` (platform equivalent).
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("diff-review").join("config.toml"))
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one the default location is
    /// tried and a missing file there yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Command-line flags win over the file.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.output_dir {
            self.export.directory = dir.clone();
        }
        if cli.no_highlight {
            self.display.syntax_highlighting = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.display.status_timeout_secs, 3);
        assert_eq!(config.display.comment_char_limit, 200);
        assert_eq!(config.export.directory, PathBuf::from("."));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = Config::parse("[display]\ncomment_char_limit = 80\n").unwrap();
        assert_eq!(config.display.comment_char_limit, 80);
        assert!(config.display.syntax_highlighting);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display\nsyntax_highlighting = yes").unwrap();
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_explicit_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn cli_overrides_file() {
        let mut config =
            Config::parse("[export]\ndirectory = \"/tmp/reviews\"\n").unwrap();
        let cli = Cli::parse_from(["diff-review", "--output-dir", "out", "--no-highlight"]);
        config.apply_cli(&cli);
        assert_eq!(config.export.directory, PathBuf::from("out"));
        assert!(!config.display.syntax_highlighting);
    }

    #[test]
    fn cli_without_flags_keeps_file_values() {
        let mut config =
            Config::parse("[export]\ndirectory = \"/tmp/reviews\"\n").unwrap();
        config.apply_cli(&Cli::parse_from(["diff-review"]));
        assert_eq!(config.export.directory, PathBuf::from("/tmp/reviews"));
    }
}
