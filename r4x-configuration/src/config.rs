//! Configuration file model.
//!
//! ```yaml
//! body_length: exact        # or: terminated
//! servers:
//!   - listen: "127.0.0.1:8080"
//!     redis:
//!       host: "127.0.0.1"
//!       port: 6379
//!     locations:
//!       - path: "/get/{key}"
//!         command: ["GET", "{path.key}"]
//!       - path: "/run/{name}"
//!         script: "scripts/run.lua"
//!         command: ["EVALSHA", "{script}", "1", "{path.name}"]
//! ```

use std::path::{Path, PathBuf};

use r4x_core::BodyLength;
use r4x_core::strutil::read_conf_file;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Length convention for the constant `null` and array bodies.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BodyLengthConfig {
    /// Visible text only (default).
    #[default]
    Exact,
    /// Visible text plus a counted NUL byte.
    Terminated,
}

impl From<BodyLengthConfig> for BodyLength {
    fn from(value: BodyLengthConfig) -> Self {
        match value {
            BodyLengthConfig::Exact => BodyLength::Exact,
            BodyLengthConfig::Terminated => BodyLength::Terminated,
        }
    }
}

/// Redis endpoint of a server block.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RedisConfig {
    /// Host name or address.
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
    6379
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// One forwarded location.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LocationConfig {
    /// Path pattern, e.g. `/get/{key}`.
    pub path: String,
    /// Script file whose digest `{script}` expands to.
    #[serde(default)]
    pub script: Option<PathBuf>,
    /// Command name followed by its argument templates.
    #[serde(default)]
    pub command: Vec<String>,
}

/// One listener with its Redis endpoint and locations.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub listen: String,
    /// Redis endpoint.
    #[serde(default)]
    pub redis: RedisConfig,
    /// Locations, matched in order.
    #[serde(default)]
    pub locations: Vec<LocationConfig>,
}

/// The whole configuration file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Length convention for constant bodies.
    #[serde(default)]
    pub body_length: BodyLengthConfig,
    /// Server blocks.
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
    /// Directory relative script paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Config {
    /// Parses a configuration from YAML. Relative script paths resolve
    /// against the working directory.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Reads and parses a configuration file. Relative script paths resolve
    /// against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading configuration");
        let contents = read_conf_file(path)?;
        let mut config = Self::from_yaml(std::str::from_utf8(&contents)?)?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }
}
