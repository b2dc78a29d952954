use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use futures::Future;
use futures::future::BoxFuture;
use futures::ready;
use pin_project::pin_project;
use r4x_core::{Error, RedisReply, ReplyEncoder};
use tracing::Span;

use crate::callback::{self, GatewayResponse};

/// Counts a request from the moment its command is issued until it is
/// finalized or dropped.
#[derive(Debug)]
pub(crate) struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    pub(crate) fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Future of one forwarded request.
///
/// Resolves once, when the reply arrives or the request fails, and turns the
/// outcome into the response. There is no timeout: a command whose reply never
/// arrives keeps this future pending.
#[pin_project]
pub struct DispatchFuture {
    #[pin]
    inner: BoxFuture<'static, Dispatched>,
    encoder: ReplyEncoder,
    head: bool,
    span: Span,
}

/// Outcome of a dispatch, with the guard of an issued command.
pub(crate) type Dispatched = (Result<RedisReply, Error>, Option<InFlight>);

impl DispatchFuture {
    pub(crate) fn new(
        inner: BoxFuture<'static, Dispatched>,
        encoder: ReplyEncoder,
        head: bool,
        span: Span,
    ) -> Self {
        Self {
            inner,
            encoder,
            head,
            span,
        }
    }
}

impl Future for DispatchFuture {
    type Output = Result<GatewayResponse, Infallible>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let _entered = this.span.enter();

        let (result, in_flight) = ready!(this.inner.poll(cx));
        let response = match result {
            Ok(reply) => callback::respond(this.encoder, reply, *this.head),
            Err(err) => callback::fail(&err),
        };
        // Finalized: the request no longer counts as in flight.
        drop(in_flight);
        Poll::Ready(Ok(response))
    }
}
