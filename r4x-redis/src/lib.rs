#![warn(missing_docs)]
//! Redis side of the r4x gateway.
//!
//! The gateway talks to Redis only through two narrow traits:
//!
//! - [`Connector`] establishes a connection to an [`Endpoint`]
//! - [`CommandExecutor`] issues one command and resolves with its [`RedisReply`]
//!
//! [`ConnectionRegistry`] shares one connection per endpoint across requests,
//! and [`RedisConnector`] implements the traits over the `redis` crate's
//! [`ConnectionManager`](redis::aio::ConnectionManager).
//!
//! [`RedisReply`]: r4x_core::RedisReply

pub mod client;
pub mod connector;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod registry;

#[doc(inline)]
pub use crate::client::{CommandExecutor, Connector, Endpoint};
#[doc(inline)]
pub use crate::connector::{RedisConnection, RedisConnector};
#[doc(inline)]
pub use crate::registry::ConnectionRegistry;
