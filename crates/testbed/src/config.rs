//! Harness configuration.
//!
//! The whole process-wide surface — log file name, MPI-style rank
//! information, verbosity, role colors — lives in an explicit
//! [`TestbedConfig`] value passed to the controller at construction, so
//! several independent controllers can coexist in one process. A config can be built in code or loaded from a TOML file; all
//! fields are optional in the file and fall back to the documented
//! defaults.
//!
//! # Example file
//!
//! ```toml
//! log_path = "testing.log"
//! verbosity = 2
//! rank_to_write = -1
//!
//! [rank]
//! rank = 0
//! n_procs = 4
//!
//! [colors]
//! fail = "m"
//! ```

use crate::output::ALL_RANKS;
use crate::palette::is_known_color;
use crate::MAX_VERBOSITY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default log file name.
pub const DEFAULT_LOG_PATH: &str = "tests.log";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParse {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// This process's position in a multi-process run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct RankInfo {
    /// Zero-based rank of this process.
    pub rank: i32,
    /// Total number of cooperating processes.
    pub n_procs: i32,
}

impl Default for RankInfo {
    fn default() -> Self {
        // Undistinguished: a lone process that always writes.
        Self { rank: 0, n_procs: 1 }
    }
}

/// Color character assigned to each output role. See
/// [`color_escape`](crate::palette::color_escape) for the character table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct ColorConfig {
    pub fail: char,
    pub info: char,
    pub pass: char,
    pub normal: char,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            fail: 'r',
            info: 'c',
            pass: 'b',
            normal: '0',
        }
    }
}

/// Full configuration surface for one controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct TestbedConfig {
    /// Where the batch log is written.
    pub log_path: PathBuf,
    /// This process's rank and the run size.
    pub rank: RankInfo,
    /// Which rank emits output; [`ALL_RANKS`] (-1) lets every rank emit.
    pub rank_to_write: i32,
    /// Informational messages with a level above this are dropped.
    pub verbosity: u8,
    /// Per-role color characters.
    pub colors: ColorConfig,
    /// Force colors on or off instead of probing the terminal.
    pub color: Option<bool>,
}

impl Default for TestbedConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            rank: RankInfo::default(),
            rank_to_write: 0,
            verbosity: 1,
            colors: ColorConfig::default(),
            color: None,
        }
    }
}

impl TestbedConfig {
    /// Load a configuration from a TOML file and validate it.
    pub fn from_toml_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Io(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate field values.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.verbosity > MAX_VERBOSITY {
            return Err(ConfigError::InvalidValue {
                field: "verbosity".to_string(),
                reason: format!("must be 0..={MAX_VERBOSITY}, got {}", self.verbosity),
            });
        }
        if self.rank_to_write < ALL_RANKS {
            return Err(ConfigError::InvalidValue {
                field: "rank_to_write".to_string(),
                reason: format!("must be a rank or {ALL_RANKS}, got {}", self.rank_to_write),
            });
        }
        for (field, ch) in [
            ("colors.fail", self.colors.fail),
            ("colors.info", self.colors.info),
            ("colors.pass", self.colors.pass),
            ("colors.normal", self.colors.normal),
        ] {
            if !is_known_color(ch) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("unknown color character '{ch}'"),
                });
            }
        }
        Ok(())
    }

    /// Set the log file path.
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// Set rank information and the writer rank.
    pub fn with_rank(mut self, rank: RankInfo, rank_to_write: i32) -> Self {
        self.rank = rank;
        self.rank_to_write = rank_to_write;
        self
    }

    /// Set the verbosity threshold.
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Force colors on or off.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = Some(color);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_documented_surface() {
        let config = TestbedConfig::default();
        assert_eq!(config.log_path, PathBuf::from("tests.log"));
        assert_eq!(config.rank, RankInfo { rank: 0, n_procs: 1 });
        assert_eq!(config.rank_to_write, 0);
        assert_eq!(config.verbosity, 1);
        assert_eq!(config.colors.fail, 'r');
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
log_path = "testing.log"
verbosity = 2
"#
        )
        .unwrap();

        let config = TestbedConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.log_path, PathBuf::from("testing.log"));
        assert_eq!(config.verbosity, 2);
        assert_eq!(config.colors, ColorConfig::default());
        assert_eq!(config.rank_to_write, 0);
    }

    #[test]
    fn full_toml_parses() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
log_path = "rank.log"
rank_to_write = -1
verbosity = 4

[rank]
rank = 2
n_procs = 4

[colors]
fail = "m"
info = "y"
pass = "g"
normal = "0"
"#
        )
        .unwrap();

        let config = TestbedConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.rank, RankInfo { rank: 2, n_procs: 4 });
        assert_eq!(config.rank_to_write, ALL_RANKS);
        assert_eq!(config.colors.fail, 'm');
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = TestbedConfig::from_toml_file(Path::new("/no/such/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not_a_field = 3\n").unwrap();
        let err = TestbedConfig::from_toml_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse { .. }));
    }

    #[test]
    fn excessive_verbosity_is_rejected() {
        let config = TestbedConfig::default().with_verbosity(9);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field, .. } if field == "verbosity"));
    }

    #[test]
    fn unknown_color_character_is_rejected() {
        let mut config = TestbedConfig::default();
        config.colors.info = 'z';
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field, .. } if field == "colors.info"));
    }
}
