//! TOML configuration.
//!
//! Every section and key is optional; a missing file yields
//! [`Config::default`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::runtime::handle::RuntimeConfig;

/// Configuration load failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File exists but could not be read.
    #[error("reading {path}: {source}")]
    Io {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// File is not valid TOML for [`Config`].
    #[error("parsing {path}: {source}")]
    Parse {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where slots are stored.
    pub storage: StorageConfig,
    /// Runtime queue and batching knobs.
    pub runtime: RuntimeConfig,
    /// Admin login.
    pub admin: AdminConfig,
    /// Share-card rendering.
    pub card: CardConfig,
}

/// Storage section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("confboard.db"),
        }
    }
}

/// Admin section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Argon2 PHC hash of the admin password.
    pub password_hash: Option<String>,
    /// How long a login stays valid.
    pub session_ttl_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password_hash: None,
            session_ttl_secs: 8 * 60 * 60,
        }
    }
}

/// Card section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    /// TrueType font replacing the bundled one.
    pub font_path: Option<PathBuf>,
}

impl Config {
    /// Parses configuration text.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Loads `path`, or defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = Config::from_toml_str(
            r#"
            [storage]
            db_path = "/tmp/board.db"

            [admin]
            password_hash = "$argon2id$v=19$m=19456,t=2,p=1$abc$def"
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.storage.db_path, PathBuf::from("/tmp/board.db"));
        assert_eq!(cfg.admin.session_ttl_secs, 8 * 60 * 60);
        assert_eq!(cfg.runtime, RuntimeConfig::default());
        assert!(cfg.card.font_path.is_none());
    }

    #[test]
    fn runtime_section_overrides_reload_interval() {
        let cfg = Config::from_toml_str(
            r#"
            [runtime]
            reload_interval_ms = 0
            flush_on_mutation = false
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.runtime.reload_interval_ms, 0);
        assert!(!cfg.runtime.flush_on_mutation);
        assert_eq!(cfg.runtime.batch_max_latency_ms, RuntimeConfig::default().batch_max_latency_ms);
    }

    #[test]
    fn missing_file_is_default() {
        let cfg = Config::load("/definitely/not/here.toml").expect("load");
        assert_eq!(cfg, Config::default());
    }
}
