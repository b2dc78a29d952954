//! Error types shared by the gateway crates.
//!
//! [`Error`] covers every way a single request can fail before or while
//! talking to Redis. Each variant maps onto one HTTP status in `r4x-tower`;
//! none of them is retried at this layer.

use thiserror::Error;

/// A per-request failure.
#[derive(Debug, Error)]
pub enum Error {
    /// No connection to the Redis endpoint could be established.
    ///
    /// Answered with `504 Gateway Timeout`. A later request tries again.
    #[error("redis endpoint {endpoint} is unavailable: {source}")]
    ConnectionUnavailable {
        /// `host:port` of the endpoint.
        endpoint: String,
        /// Underlying client error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The request method is neither `GET` nor `HEAD`.
    #[error("method {0} is not allowed")]
    MethodNotAllowed(String),

    /// No configured location matches the request path.
    #[error("no location matches {0}")]
    NotFound(String),

    /// A command argument could not be evaluated for this request.
    #[error("failed to resolve argument {index}: {reason}")]
    ArgumentResolution {
        /// Position of the argument in the command.
        index: usize,
        /// What went wrong.
        reason: String,
    },

    /// The command was sent but the exchange failed below the reply level,
    /// or the response could not be emitted.
    #[error("transport failure: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// A substring range falls outside its source buffer.
    #[error("range {offset}..{offset}+{len} is out of bounds for a buffer of {size} bytes")]
    OutOfRange {
        /// Start of the range.
        offset: usize,
        /// Length of the range.
        len: usize,
        /// Size of the source buffer.
        size: usize,
    },
}

impl Error {
    /// Wraps an error into [`Error::Transport`].
    pub fn transport<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Transport(error.into())
    }
}
