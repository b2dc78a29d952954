//! Redis client interface.

use std::fmt;

use async_trait::async_trait;
use r4x_core::{CommandArgv, Error, RedisReply};

/// Address of a Redis server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Host name or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Endpoint {
    /// Creates an endpoint.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `redis://` URL for this endpoint.
    pub fn url(&self) -> String {
        if self.host.contains(':') {
            format!("redis://[{}]:{}/", self.host, self.port)
        } else {
            format!("redis://{}:{}/", self.host, self.port)
        }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new("127.0.0.1", 6379)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Issues commands over an established connection.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Sends one command and resolves once its reply arrives.
    ///
    /// Error replies from the server resolve to [`RedisReply::Error`]; an
    /// `Err` means the exchange itself failed ([`Error::Transport`]).
    async fn execute(&self, argv: CommandArgv) -> Result<RedisReply, Error>;
}

/// Establishes connections to Redis endpoints.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Connection handle, cheap to clone and shared between requests.
    type Connection: CommandExecutor + Clone + Send + Sync + 'static;

    /// Connects to `endpoint`, failing with [`Error::ConnectionUnavailable`].
    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Connection, Error>;
}
