//! Reply to response body encoding.
//!
//! [`ReplyEncoder`] turns one [`RedisReply`] into exactly one [`EncodedReply`]:
//! the bytes of the HTTP body plus its content length.
//!
//! | Reply | Body |
//! |-------|------|
//! | `Status`, `BulkString`, `Error` | the reply's own bytes, verbatim |
//! | `Integer` | base-10 ASCII |
//! | `Nil` | `null` |
//! | `Array` | `{"err": "redis arrays do not send by http"}` |
//!
//! Error replies are not mapped to an HTTP error status: the body carries the
//! server's message text and the status stays `200`.

use bytes::Bytes;

use crate::RedisReply;

/// Upper bound on the formatted length of an integer reply.
///
/// `i64::MIN` formats to 20 characters, well within the bound.
pub const INTEGER_BUFFER_SIZE: usize = 64;

const NULL_BODY: &[u8] = b"null";
const NULL_BODY_TERMINATED: &[u8] = b"null\0";
const ARRAY_BODY: &[u8] = br#"{"err": "redis arrays do not send by http"}"#;
const ARRAY_BODY_TERMINATED: &[u8] = b"{\"err\": \"redis arrays do not send by http\"}\0";

/// How the constant `Nil` and `Array` bodies are sized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyLength {
    /// Emit exactly the visible text.
    #[default]
    Exact,
    /// Emit the visible text followed by a NUL byte, counted in the content
    /// length. Matches gateways that size these bodies as C strings.
    Terminated,
}

/// An encoded response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedReply {
    body: Bytes,
}

impl EncodedReply {
    /// The body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Value of the `content-length` header.
    pub fn content_length(&self) -> u64 {
        self.body.len() as u64
    }

    /// Consumes the reply, returning the body.
    pub fn into_body(self) -> Bytes {
        self.body
    }
}

/// Encodes Redis replies into HTTP response bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplyEncoder {
    length: BodyLength,
}

impl ReplyEncoder {
    /// Creates an encoder with the given constant-body length convention.
    pub fn new(length: BodyLength) -> Self {
        Self { length }
    }

    /// The configured length convention.
    pub fn body_length(&self) -> BodyLength {
        self.length
    }

    /// Encodes a reply. Never fails.
    ///
    /// Only integer replies allocate; string-like replies hand over their own
    /// buffer and the constant bodies are static.
    pub fn encode(&self, reply: RedisReply) -> EncodedReply {
        let body = match reply {
            RedisReply::Status(data) | RedisReply::BulkString(data) | RedisReply::Error(data) => {
                data
            }
            RedisReply::Integer(value) => {
                let text = value.to_string();
                debug_assert!(text.len() <= INTEGER_BUFFER_SIZE);
                Bytes::from(text)
            }
            RedisReply::Nil => Bytes::from_static(match self.length {
                BodyLength::Exact => NULL_BODY,
                BodyLength::Terminated => NULL_BODY_TERMINATED,
            }),
            RedisReply::Array(_) => Bytes::from_static(match self.length {
                BodyLength::Exact => ARRAY_BODY,
                BodyLength::Terminated => ARRAY_BODY_TERMINATED,
            }),
        };
        EncodedReply { body }
    }
}
