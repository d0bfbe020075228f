//! Runtime configuration.
//!
//! # Responsibility
//! - Define the explicit configuration value handed to components at startup.
//! - Load it from an optional TOML file, normalize and validate it.
//!
//! # Invariants
//! - There is no process-global configuration; callers pass `Config` (or
//!   one of its sections) to whatever needs it.
//! - A `Config` returned by `load` or `Config::default` passes `validate`.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// CORS origin entry that allows every origin. Credentials are disabled
/// when it is used.
pub const CORS_ANY_ORIGIN: &str = "*";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address, e.g. `127.0.0.1:8000`.
    pub bind: String,
    /// Route prefix for note endpoints, e.g. `/api/v1`.
    pub api_prefix: String,
    /// Origins allowed by CORS. `["*"]` allows any origin.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite file path. `:memory:` opens an in-memory database.
    pub path: PathBuf,
    /// Insert sample notes when the database is empty at startup.
    pub auto_seed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files; stderr when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            api_prefix: "/api/v1".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("notes.db"),
            auto_seed: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == ":memory:"
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Validation(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Validation(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

impl Config {
    /// Loads, normalizes and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parses a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let mut cfg: Config = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Trims values and canonicalizes the API prefix (`api/v1/` -> `/api/v1`).
    pub fn normalize(&mut self) {
        self.server.bind = self.server.bind.trim().to_string();
        let prefix = self.server.api_prefix.trim().trim_end_matches('/');
        self.server.api_prefix = if prefix.is_empty() || prefix.starts_with('/') {
            prefix.to_string()
        } else {
            format!("/{prefix}")
        };
        self.server.cors_origins = self
            .server
            .cors_origins
            .iter()
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
        self.logging.level = self.logging.level.trim().to_ascii_lowercase();
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.is_empty() {
            return Err(ConfigError::Validation(
                "server.bind must be non-empty".to_string(),
            ));
        }
        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "server.bind `{}` is not a socket address",
                self.server.bind
            )));
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "database.path must be non-empty".to_string(),
            ));
        }
        let origins = &self.server.cors_origins;
        if origins.len() > 1 && origins.iter().any(|origin| origin == CORS_ANY_ORIGIN) {
            return Err(ConfigError::Validation(
                "server.cors_origins may contain `*` only as its sole entry".to_string(),
            ));
        }
        crate::logging::normalize_level(&self.logging.level).map_err(ConfigError::Validation)?;
        if let Some(dir) = &self.logging.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Validation(format!(
                    "logging.log_dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigError, CORS_ANY_ORIGIN};

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        cfg.validate().expect("defaults should validate");
        assert_eq!(cfg.server.api_prefix, "/api/v1");
        assert!(cfg.database.auto_seed);
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let cfg = Config::from_toml_str(
            r#"
            [database]
            path = "/tmp/notes.db"
            "#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.database.path.to_str(), Some("/tmp/notes.db"));
        assert_eq!(cfg.server.bind, "127.0.0.1:8000");
    }

    #[test]
    fn prefix_is_normalized() {
        let cfg = Config::from_toml_str(
            r#"
            [server]
            api_prefix = " api/v2/ "
            "#,
        )
        .expect("config should parse");
        assert_eq!(cfg.server.api_prefix, "/api/v2");
    }

    #[test]
    fn invalid_bind_and_level_are_rejected() {
        let err = Config::from_toml_str("[server]\nbind = \"nope\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = Config::from_toml_str("[logging]\nlevel = \"loud\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("[server]\nport = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn wildcard_origin_is_accepted_only_on_its_own() {
        let cfg = Config::from_toml_str("[server]\ncors_origins = [\" * \"]\n")
            .expect("sole wildcard should validate");
        assert_eq!(cfg.server.cors_origins, vec![CORS_ANY_ORIGIN.to_string()]);

        let err = Config::from_toml_str(
            "[server]\ncors_origins = [\"*\", \"http://localhost:3000\"]\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = Config::from_toml_str("[logging]\nlog_dir = \"logs\"\n").unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }
}
