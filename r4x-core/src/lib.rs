#![warn(missing_docs)]
//! # r4x-core
//!
//! Protocol-agnostic building blocks of the r4x gateway, which turns HTTP
//! requests into Redis commands and Redis replies into HTTP response bodies.
//!
//! This crate holds everything that does no I/O on the request path:
//!
//! - **Replies** ([`RedisReply`]) and the per-request argument list ([`CommandArgv`])
//! - **Encoding** a reply into a response body ([`ReplyEncoder`])
//! - **Naming** script bodies by content ([`Digest`])
//! - **Buffer helpers** for bounded substrings and configuration-time file
//!   reads ([`strutil`])
//!
//! The Redis client lives in `r4x-redis`, request templates in `r4x-http` and
//! the Tower service that ties them together in `r4x-tower`.

pub mod argv;
pub mod digest;
pub mod encoder;
pub mod error;
pub mod reply;
pub mod strutil;

pub use argv::CommandArgv;
pub use digest::Digest;
pub use encoder::{BodyLength, EncodedReply, ReplyEncoder};
pub use error::Error;
pub use reply::RedisReply;
pub use strutil::ReadError;
