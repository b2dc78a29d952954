//! Shared connections, one per endpoint.

use std::sync::Arc;

use dashmap::DashMap;
use r4x_core::Error;
use tokio::sync::OnceCell;
use tracing::{debug, trace};

use crate::{Connector, Endpoint};

/// Owns the connections of every configured endpoint.
///
/// Connections are established lazily by the first request that needs them
/// and shared by every later request. Concurrent first requests wait on the
/// same attempt. A failed attempt leaves nothing behind, so the next request
/// tries again; there is no retry within a request.
pub struct ConnectionRegistry<C: Connector> {
    connector: C,
    connections: DashMap<Endpoint, Arc<OnceCell<C::Connection>>>,
}

impl<C: Connector> ConnectionRegistry<C> {
    /// Creates an empty registry.
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            connections: DashMap::new(),
        }
    }

    /// Returns the connection to `endpoint`, establishing it if needed.
    pub async fn ensure(&self, endpoint: &Endpoint) -> Result<C::Connection, Error> {
        trace!(%endpoint, "Get connection");
        // Clone the cell out so no map guard is held across the await.
        let cell = Arc::clone(self.connections.entry(endpoint.clone()).or_default().value());
        let connection = cell
            .get_or_try_init(|| async {
                trace!(%endpoint, "Establish new connection");
                let result = self.connector.connect(endpoint).await;
                if let Err(err) = &result {
                    debug!(%endpoint, error = %err, "Connection attempt failed");
                }
                result
            })
            .await?;
        Ok(connection.clone())
    }

    /// Returns `true` if a connection to `endpoint` is currently held.
    pub fn is_connected(&self, endpoint: &Endpoint) -> bool {
        self.connections
            .get(endpoint)
            .is_some_and(|cell| cell.initialized())
    }

    /// The underlying connector.
    pub fn connector(&self) -> &C {
        &self.connector
    }
}
