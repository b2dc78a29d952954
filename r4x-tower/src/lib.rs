//! Tower integration of the r4x gateway.
//!
//! [`RedisService`] is a Tower [`Service`](tower::Service) that answers every
//! request with the reply of one Redis command:
//!
//! 1. only `GET` and `HEAD` are accepted (`405` otherwise);
//! 2. the first matching location is picked (`404` if none);
//! 3. the connection to the server's endpoint is ensured (`504` on failure);
//! 4. the location's templates are resolved into arguments (`500` on failure);
//! 5. one command is issued and the request waits for its reply;
//! 6. the reply is encoded into a `200` response body.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use r4x_http::{CommandTemplate, Location, Routes};
//! use r4x_redis::{ConnectionRegistry, Endpoint, RedisConnector};
//! use r4x_tower::RedisService;
//!
//! let location = Location::new(
//!     "/get/{key}",
//!     vec![
//!         CommandTemplate::compile("GET", None).unwrap(),
//!         CommandTemplate::compile("{path.key}", None).unwrap(),
//!     ],
//! )
//! .unwrap();
//!
//! let service = RedisService::builder(Arc::new(ConnectionRegistry::new(RedisConnector::new())))
//!     .endpoint(Endpoint::new("127.0.0.1", 6379))
//!     .routes(Routes::new(vec![location]))
//!     .build();
//! ```

#![warn(missing_docs)]

/// Response finalization.
pub mod callback;
/// Future of a forwarded request.
pub mod future;
/// The Tower service.
pub mod service;

pub use callback::GatewayResponse;
pub use future::DispatchFuture;
pub use service::{RedisService, RedisServiceBuilder};
