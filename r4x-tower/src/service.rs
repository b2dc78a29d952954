use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use futures::FutureExt;
use http::request::Parts;
use http::{Method, Request};
use r4x_core::{CommandArgv, Error, RedisReply, ReplyEncoder};
use r4x_http::{RequestContext, Routes};
use r4x_redis::{CommandExecutor, ConnectionRegistry, Connector, Endpoint};
use tower::Service;
use tracing::{info_span, trace};

use crate::callback::GatewayResponse;
use crate::future::{DispatchFuture, InFlight};

struct Shared<C: Connector> {
    registry: Arc<ConnectionRegistry<C>>,
    endpoint: Endpoint,
    routes: Routes,
    encoder: ReplyEncoder,
    in_flight: Arc<AtomicUsize>,
}

/// Tower service forwarding each request to Redis as one command.
///
/// One service serves one server block: a Redis endpoint and its locations.
/// Services of different server blocks may share a [`ConnectionRegistry`].
pub struct RedisService<C: Connector> {
    shared: Arc<Shared<C>>,
}

impl<C: Connector> Clone for RedisService<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C: Connector> RedisService<C> {
    /// Creates a builder using `registry` for connections.
    pub fn builder(registry: Arc<ConnectionRegistry<C>>) -> RedisServiceBuilder<C> {
        RedisServiceBuilder {
            registry,
            endpoint: Endpoint::default(),
            routes: Routes::default(),
            encoder: ReplyEncoder::default(),
        }
    }

    /// The Redis endpoint commands are sent to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.shared.endpoint
    }

    /// Requests whose command was issued but which are not yet finalized.
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.load(Ordering::SeqCst)
    }
}

impl<C, ReqBody> Service<Request<ReqBody>> for RedisService<C>
where
    C: Connector,
{
    type Response = GatewayResponse;
    type Error = Infallible;
    type Future = DispatchFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // Only GET and HEAD are served, so the body is never read.
        let (parts, _body) = req.into_parts();
        let span = info_span!("r4x.request", method = %parts.method, uri = %parts.uri);
        let head = parts.method == Method::HEAD;

        DispatchFuture::new(
            dispatch(Arc::clone(&self.shared), parts).boxed(),
            self.shared.encoder,
            head,
            span,
        )
    }
}

/// Runs one request up to its reply.
///
/// The in-flight guard is taken only once a command is issued; requests
/// answered before that are never counted.
async fn dispatch<C: Connector>(
    shared: Arc<Shared<C>>,
    parts: Parts,
) -> (Result<RedisReply, Error>, Option<InFlight>) {
    match resolve(&shared, &parts).await {
        Ok((connection, argv)) => {
            let in_flight = InFlight::enter(&shared.in_flight);
            (connection.execute(argv).await, Some(in_flight))
        }
        Err(err) => (Err(err), None),
    }
}

async fn resolve<C: Connector>(
    shared: &Shared<C>,
    parts: &Parts,
) -> Result<(C::Connection, CommandArgv), Error> {
    if parts.method != Method::GET && parts.method != Method::HEAD {
        return Err(Error::MethodNotAllowed(parts.method.to_string()));
    }

    let (location, captures) = shared
        .routes
        .route(parts.uri.path())
        .ok_or_else(|| Error::NotFound(parts.uri.path().to_owned()))?;

    let connection = shared.registry.ensure(&shared.endpoint).await?;
    trace!(endpoint = %shared.endpoint, "Connection ensured");

    let argv = {
        let ctx = RequestContext::new(parts, captures);
        location.resolve(&ctx)?
    };
    trace!(location = location.path(), ?argv, argc = argv.argc(), "Arguments resolved");

    Ok((connection, argv))
}

/// Builder for [`RedisService`].
pub struct RedisServiceBuilder<C: Connector> {
    registry: Arc<ConnectionRegistry<C>>,
    endpoint: Endpoint,
    routes: Routes,
    encoder: ReplyEncoder,
}

impl<C: Connector> RedisServiceBuilder<C> {
    /// Sets the Redis endpoint.
    pub fn endpoint(self, endpoint: Endpoint) -> Self {
        Self { endpoint, ..self }
    }

    /// Sets the locations served.
    pub fn routes(self, routes: Routes) -> Self {
        Self { routes, ..self }
    }

    /// Sets the reply encoder.
    pub fn encoder(self, encoder: ReplyEncoder) -> Self {
        Self { encoder, ..self }
    }

    /// Builds the service.
    pub fn build(self) -> RedisService<C> {
        RedisService {
            shared: Arc::new(Shared {
                registry: self.registry,
                endpoint: self.endpoint,
                routes: self.routes,
                encoder: self.encoder,
                in_flight: Arc::new(AtomicUsize::new(0)),
            }),
        }
    }
}
