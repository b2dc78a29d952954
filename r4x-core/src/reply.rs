//! Redis reply values.

use bytes::Bytes;

/// A reply returned by Redis for a single command.
///
/// One case per reply kind, with [`RedisReply::Array`] nesting further replies.
/// Byte payloads are kept as [`Bytes`] so that encoding a reply into a response
/// body never copies them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedisReply {
    /// Simple status reply, e.g. `OK`.
    Status(Bytes),
    /// Binary-safe string reply.
    BulkString(Bytes),
    /// Error reply, carrying the server's message text (e.g. `ERR unknown command`).
    Error(Bytes),
    /// Signed 64-bit integer reply.
    Integer(i64),
    /// Missing value.
    Nil,
    /// Multi-bulk reply.
    Array(Vec<RedisReply>),
}

impl RedisReply {
    /// Short lowercase name of the reply kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RedisReply::Status(_) => "status",
            RedisReply::BulkString(_) => "bulk_string",
            RedisReply::Error(_) => "error",
            RedisReply::Integer(_) => "integer",
            RedisReply::Nil => "nil",
            RedisReply::Array(_) => "array",
        }
    }

    /// Builds a status reply from static text.
    pub fn status(text: &'static str) -> Self {
        RedisReply::Status(Bytes::from_static(text.as_bytes()))
    }

    /// Builds a bulk string reply.
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        RedisReply::BulkString(data.into())
    }

    /// Builds an error reply.
    pub fn error(message: impl Into<Bytes>) -> Self {
        RedisReply::Error(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(RedisReply::status("OK").kind(), "status");
        assert_eq!(RedisReply::bulk("v").kind(), "bulk_string");
        assert_eq!(RedisReply::error("ERR").kind(), "error");
        assert_eq!(RedisReply::Integer(1).kind(), "integer");
        assert_eq!(RedisReply::Nil.kind(), "nil");
        assert_eq!(RedisReply::Array(vec![]).kind(), "array");
    }
}
