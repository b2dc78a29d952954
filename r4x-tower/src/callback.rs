//! Turning the outcome of a dispatched command into the HTTP response.
//!
//! Every request ends here exactly once: [`respond`] when Redis replied,
//! [`fail`] when the request failed before or during the exchange.

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_LENGTH};
use http::{Response, StatusCode};
use http_body_util::Full;
use r4x_core::{Error, RedisReply, ReplyEncoder};
use tracing::{debug, error, trace, warn};

/// Response type produced by the gateway.
pub type GatewayResponse = Response<Full<Bytes>>;

/// Builds the `200` response carrying an encoded reply.
///
/// For `HEAD` requests the body is left out but the content length still
/// describes it. If the response cannot be assembled the request is answered
/// with `500` instead.
pub fn respond(encoder: &ReplyEncoder, reply: RedisReply, head: bool) -> GatewayResponse {
    trace!(kind = reply.kind(), "Reply received");
    let encoded = encoder.encode(reply);
    let content_length = encoded.content_length();
    let body = if head { Bytes::new() } else { encoded.into_body() };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_LENGTH, content_length)
        .body(Full::new(body))
        .unwrap_or_else(|err| {
            error!(error = %err, "Failed to emit response");
            internal_error()
        })
}

/// Builds the error response for a failed request.
pub fn fail(err: &Error) -> GatewayResponse {
    let status = status_for(err);
    if status.is_server_error() {
        warn!(%status, error = %err, "Request failed");
    } else {
        debug!(%status, error = %err, "Request rejected");
    }

    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_LENGTH, 0);
    if matches!(err, Error::MethodNotAllowed(_)) {
        builder = builder.header(ALLOW, "GET, HEAD");
    }
    builder
        .body(Full::default())
        .unwrap_or_else(|_| internal_error())
}

/// HTTP status answering `err`.
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::ConnectionUnavailable { .. } => StatusCode::GATEWAY_TIMEOUT,
        Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::ArgumentResolution { .. } | Error::Transport(_) | Error::OutOfRange { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn internal_error() -> GatewayResponse {
    let mut response = Response::new(Full::default());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
