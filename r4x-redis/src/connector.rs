//! [`Connector`] implementation over the `redis` crate.

use async_trait::async_trait;
use bytes::Bytes;
use r4x_core::{CommandArgv, RedisReply};
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{Client, RedisError, ServerError, Value};
use tracing::trace;

use crate::error::Error;
use crate::{CommandExecutor, Connector, Endpoint};

/// Connects to Redis with a [`ConnectionManager`] per endpoint.
///
/// The manager multiplexes every command over one connection and reconnects
/// lazily after it drops. The first connection is tried once: a refused
/// endpoint fails the request at once and the next request tries again.
/// Commands have no response timeout.
///
/// [`ConnectionManager`]: redis::aio::ConnectionManager
#[derive(Debug, Clone, Default)]
pub struct RedisConnector;

impl RedisConnector {
    /// Creates a connector.
    pub fn new() -> Self {
        Self
    }
}

/// Connection handle returned by [`RedisConnector`].
#[derive(Clone)]
pub struct RedisConnection {
    manager: ConnectionManager,
}

#[async_trait]
impl Connector for RedisConnector {
    type Connection = RedisConnection;

    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Connection, r4x_core::Error> {
        trace!(%endpoint, "Initialize new redis connection manager");
        let client = Client::open(endpoint.url())
            .map_err(|err| Error::from(err).into_unavailable(endpoint))?;
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(0)
            .set_response_timeout(None);
        let manager = client
            .get_connection_manager_with_config(config)
            .await
            .map_err(|err| Error::from(err).into_unavailable(endpoint))?;
        Ok(RedisConnection { manager })
    }
}

#[async_trait]
impl CommandExecutor for RedisConnection {
    async fn execute(&self, argv: CommandArgv) -> Result<RedisReply, r4x_core::Error> {
        let mut con = self.manager.clone();
        let mut cmd = redis::Cmd::new();
        for arg in argv.iter() {
            cmd.arg(arg.as_ref());
        }

        match cmd.query_async::<Value>(&mut con).await {
            Ok(value) => Ok(reply_from_value(value)),
            Err(err) => reply_from_error(err),
        }
    }
}

/// Converts a `redis` value into a reply.
///
/// RESP3-only kinds fold into the closest RESP2 reply: maps, sets and pushes
/// become arrays, doubles become bulk strings and booleans become integers.
/// Attributes are dropped in favour of the data they annotate.
pub fn reply_from_value(value: Value) -> RedisReply {
    match value {
        Value::Nil => RedisReply::Nil,
        Value::Int(value) => RedisReply::Integer(value),
        Value::BulkString(data) => RedisReply::BulkString(Bytes::from(data)),
        Value::SimpleString(text) => RedisReply::Status(Bytes::from(text)),
        Value::Okay => RedisReply::status("OK"),
        Value::Array(items) | Value::Set(items) | Value::Push { data: items, .. } => {
            RedisReply::Array(items.into_iter().map(reply_from_value).collect())
        }
        Value::Map(pairs) => RedisReply::Array(
            pairs
                .into_iter()
                .flat_map(|(key, value)| [reply_from_value(key), reply_from_value(value)])
                .collect(),
        ),
        Value::Double(value) => RedisReply::BulkString(Bytes::from(value.to_string())),
        Value::Boolean(value) => RedisReply::Integer(i64::from(value)),
        Value::VerbatimString { text, .. } => RedisReply::BulkString(Bytes::from(text)),
        Value::Attribute { data, .. } => reply_from_value(*data),
        Value::ServerError(err) => error_reply(&err),
        // Big numbers; their representation depends on the client's features.
        other => RedisReply::Status(Bytes::from(format!("{other:?}"))),
    }
}

/// Splits client errors into server error replies and transport failures.
///
/// Errors that carry a server error code (`ERR`, `WRONGTYPE`, `NOSCRIPT`, ...)
/// are replies like any other and become [`RedisReply::Error`] with the
/// server's message text.
pub fn reply_from_error(err: RedisError) -> Result<RedisReply, r4x_core::Error> {
    match err.code() {
        Some(code) if !err.is_io_error() => {
            trace!(%code, "redis returned an error reply");
            Ok(error_text(code, err.detail()))
        }
        _ => Err(Error::from(err).into()),
    }
}

fn error_reply(err: &ServerError) -> RedisReply {
    error_text(err.code(), err.details())
}

fn error_text(code: &str, detail: Option<&str>) -> RedisReply {
    let text = match detail {
        Some(detail) => format!("{code} {detail}"),
        None => code.to_owned(),
    };
    RedisReply::Error(Bytes::from(text))
}
