//! Error types for the Redis client.
//!
//! [`Error`] wraps failures of the underlying [`redis`] crate. It is converted
//! into the gateway-wide [`r4x_core::Error`] at the trait boundary, where the
//! caller decides whether it was a connection or a transport failure.

use redis::RedisError;

use crate::Endpoint;

/// Error type for Redis client operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the underlying Redis client.
    ///
    /// This includes connection failures, protocol errors and I/O errors.
    #[error("Redis client error: {0}")]
    Redis(#[from] RedisError),
}

impl Error {
    /// Converts into a connection failure for `endpoint`.
    pub fn into_unavailable(self, endpoint: &Endpoint) -> r4x_core::Error {
        r4x_core::Error::ConnectionUnavailable {
            endpoint: endpoint.to_string(),
            source: Box::new(self),
        }
    }
}

impl From<Error> for r4x_core::Error {
    fn from(error: Error) -> Self {
        r4x_core::Error::Transport(Box::new(error))
    }
}
