//! Remote debugging configuration
//!
//! Settings are read from a TOML file, by default
//! `<config dir>/rdb/config.toml`, and can be overridden through the
//! `RDB_ADDRESS` and `RDB_PORT` environment variables.
//!
//! ```toml
//! color_scheme = "linux"
//! exec_lines = ["where"]
//!
//! [listen]
//! address = "127.0.0.1"
//! port = 4444
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Interface the session listens on unless told otherwise
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";

/// Port the session listens on unless told otherwise
pub const DEFAULT_PORT: u16 = 4444;

pub const ADDRESS_ENV: &str = "RDB_ADDRESS";
pub const PORT_ENV: &str = "RDB_PORT";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen: ListenConfig,
    pub color_scheme: ColorScheme,
    /// Commands run at the start of every session, before the first prompt
    pub exec_lines: Vec<String>,
}

/// Where the session socket is bound
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub address: String,
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// How the debugger core colours its output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    NoColor,
    #[default]
    Linux,
    LightBg,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid port in {variable}: {value:?}")]
    InvalidPort { variable: &'static str, value: String },
}

impl Config {
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Load config from a TOML file. Returns `None` if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file");
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(Some(config))
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rdb").join("config.toml"))
    }

    /// Load the default config file if there is one, then apply environment
    /// overrides
    pub fn discover() -> Result<Self, ConfigError> {
        let mut config = match Self::default_path() {
            Some(path) => Self::load(&path)?.unwrap_or_default(),
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Override listen settings from variables looked up through `lookup`
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(address) = lookup(ADDRESS_ENV) {
            tracing::debug!(%address, "listen address overridden from environment");
            self.listen.address = address;
        }

        if let Some(value) = lookup(PORT_ENV) {
            let port = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort {
                    variable: PORT_ENV,
                    value: value.clone(),
                })?;
            tracing::debug!(port, "listen port overridden from environment");
            self.listen.port = port;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.listen.address, "127.0.0.1");
        assert_eq!(config.listen.port, 4444);
        assert_eq!(config.color_scheme, ColorScheme::Linux);
        assert!(config.exec_lines.is_empty());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml("[listen]\nport = 5555\n").unwrap();
        assert_eq!(config.listen.port, 5555);
        assert_eq!(config.listen.address, DEFAULT_ADDRESS);
        assert_eq!(config.color_scheme, ColorScheme::Linux);
    }

    #[test]
    fn full_file() {
        let config = Config::from_toml(
            r#"
color_scheme = "nocolor"
exec_lines = ["where", "help"]

[listen]
address = "0.0.0.0"
port = 4445
"#,
        )
        .unwrap();

        assert_eq!(
            config,
            Config {
                listen: ListenConfig {
                    address: "0.0.0.0".to_string(),
                    port: 4445,
                },
                color_scheme: ColorScheme::NoColor,
                exec_lines: vec!["where".to_string(), "help".to_string()],
            }
        );
    }

    #[test]
    fn unknown_color_scheme_is_rejected() {
        assert!(Config::from_toml("color_scheme = \"neon\"").is_err());
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load(&dir.path().join("config.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "color_scheme = \"lightbg\"\n").unwrap();

        let loaded = Config::load(&path).unwrap().unwrap();
        assert_eq!(loaded.color_scheme, ColorScheme::LightBg);
    }

    #[test]
    fn load_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[listen\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"), "{err}");
    }

    #[test]
    fn environment_overrides() {
        let vars: HashMap<&str, &str> = [(ADDRESS_ENV, "0.0.0.0"), (PORT_ENV, " 7000 ")].into();
        let mut config = Config::default();

        config
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.listen.address, "0.0.0.0");
        assert_eq!(config.listen.port, 7000);
    }

    #[test]
    fn invalid_port_override() {
        let mut config = Config::default();

        let err = config
            .apply_overrides(|name| (name == PORT_ENV).then(|| "http".to_string()))
            .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidPort { .. }));
        assert_eq!(config.listen.port, DEFAULT_PORT);
    }
}
