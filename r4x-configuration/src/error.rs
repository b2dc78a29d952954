use std::net::AddrParseError;
use std::path::PathBuf;

use r4x_core::ReadError;
use r4x_http::{LocationError, TemplateError};
use thiserror::Error;

/// Failure to load or compile a configuration. Aborts startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Read(#[from] ReadError),

    /// The configuration file is not valid UTF-8.
    #[error("configuration is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// The YAML does not describe a configuration.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// No server block is configured.
    #[error("configuration has no servers")]
    NoServers,

    /// A server's listen address is not a socket address.
    #[error("invalid listen address {listen}: {source}")]
    InvalidListen {
        /// The configured address.
        listen: String,
        /// Parse failure.
        #[source]
        source: AddrParseError,
    },

    /// A location could not be built.
    #[error(transparent)]
    Location(#[from] LocationError),

    /// A command argument template does not compile.
    #[error("location {path}, argument {index}: {source}")]
    Template {
        /// Location path pattern.
        path: String,
        /// Argument position.
        index: usize,
        /// Compile failure.
        #[source]
        source: TemplateError,
    },

    /// A location's script file does not exist.
    #[error("script {} not found", .0.display())]
    ScriptMissing(PathBuf),
}
