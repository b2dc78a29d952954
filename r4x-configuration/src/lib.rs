//! Configuration for the r4x gateway.
//!
//! A YAML file describes one or more server blocks; each listens on an
//! address, forwards to one Redis endpoint and lists its locations. Loading
//! goes in two steps:
//!
//! 1. [`Config::from_file`] reads and parses the file;
//! 2. [`Config::compile`] validates it and compiles every command template
//!    into a ready-to-serve [`Gateway`].
//!
//! Any failure aborts startup; no partial configuration is ever served.

#![warn(missing_docs)]

/// Compiled configuration.
pub mod compile;
pub mod config;
/// Configuration errors.
pub mod error;

pub use compile::{Gateway, Server};
pub use config::{BodyLengthConfig, Config, LocationConfig, RedisConfig, ServerConfig};
pub use error::ConfigError;
