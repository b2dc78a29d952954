//! The r4x HTTP server.
//!
//! Each configured server block gets its own listener and axum router. Every
//! path is handed to one [`RedisService`]; routing among locations happens
//! inside the service, so the router only owns the listener plumbing.
//!
//! All blocks share one [`ConnectionRegistry`], so blocks pointing at the
//! same Redis endpoint share its connection.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use r4x_configuration::{ConfigError, Gateway, Server};
use r4x_core::ReplyEncoder;
use r4x_redis::{ConnectionRegistry, Connector};
use r4x_tower::RedisService;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Failure to start or run the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A listener could not be bound.
    #[error("failed to bind {listen}: {source}")]
    Bind {
        /// Address from the configuration.
        listen: SocketAddr,
        /// Bind failure.
        #[source]
        source: io::Error,
    },

    /// A listener failed while serving.
    #[error("server error: {0}")]
    Serve(#[source] io::Error),

    /// A server task panicked or was cancelled.
    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Builds the router of one server block.
pub fn router<C: Connector>(
    registry: Arc<ConnectionRegistry<C>>,
    server: Server,
    encoder: ReplyEncoder,
) -> Router {
    let service = RedisService::builder(registry)
        .endpoint(server.endpoint)
        .routes(server.routes)
        .encoder(encoder)
        .build();
    Router::new().fallback_service(service)
}

/// Serves every server block of `gateway` until `shutdown` resolves.
///
/// All listeners are bound before any request is accepted; a bind failure
/// aborts startup. After `shutdown`, in-flight requests are allowed to
/// finish.
pub async fn run<C, F>(
    gateway: Gateway,
    registry: Arc<ConnectionRegistry<C>>,
    shutdown: F,
) -> Result<(), ServerError>
where
    C: Connector,
    F: Future<Output = ()> + Send + 'static,
{
    let mut listeners = Vec::with_capacity(gateway.servers.len());
    for server in gateway.servers {
        let listener = TcpListener::bind(server.listen)
            .await
            .map_err(|source| ServerError::Bind {
                listen: server.listen,
                source,
            })?;
        listeners.push((listener, server));
    }

    let (stop, stopped) = watch::channel(());
    let mut tasks = JoinSet::new();
    for (listener, server) in listeners {
        info!(listen = %server.listen, endpoint = %server.endpoint, "Listening");
        let app = router(Arc::clone(&registry), server, gateway.encoder);
        let mut stopped = stopped.clone();
        tasks.spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stopped.changed().await;
                })
                .await
        });
    }

    tokio::spawn(async move {
        shutdown.await;
        info!("Shutting down");
        let _ = stop.send(());
    });

    // Dropping the set on error aborts the remaining listeners.
    while let Some(result) = tasks.join_next().await {
        if let Err(err) = result?.map_err(ServerError::Serve) {
            error!(error = %err, "Listener stopped");
            return Err(err);
        }
    }
    Ok(())
}
