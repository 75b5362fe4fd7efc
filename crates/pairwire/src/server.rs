//! `PairwireServer` builder and server loop.
//!
//! This is the entry point for running a pairwire signaling server. It
//! ties together all the layers: transport → protocol → matchmaking.

use std::sync::Arc;

use pairwire_core::Switchboard;
use pairwire_protocol::{Codec, JsonCodec};
use pairwire_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::PairwireError;
use crate::gateway::ChannelGateway;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. All
/// matchmaking goes through the single `switchboard` mutex, which keeps
/// the engine free of interleaved mutations.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) switchboard: Mutex<Switchboard<Arc<ChannelGateway>>>,
    pub(crate) gateway: Arc<ChannelGateway>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a pairwire server.
///
/// # Example
///
/// ```rust,ignore
/// use pairwire::PairwireServerBuilder;
///
/// let server = PairwireServerBuilder::new()
///     .bind("0.0.0.0:4000")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct PairwireServerBuilder {
    bind_addr: String,
}

impl PairwireServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:4000".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Builds and starts the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport` as defaults.
    pub async fn build(self) -> Result<PairwireServer<JsonCodec>, PairwireError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let gateway = Arc::new(ChannelGateway::new());
        let state = Arc::new(ServerState {
            switchboard: Mutex::new(Switchboard::new(Arc::clone(&gateway))),
            gateway,
            codec: JsonCodec,
        });

        Ok(PairwireServer { transport, state })
    }
}

impl Default for PairwireServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running pairwire signaling server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PairwireServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl<C> PairwireServer<C>
where
    C: Codec + Clone + Send + Sync + 'static,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each
    /// one. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), PairwireError> {
        tracing::info!("pairwire server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The builder must be constructible without naming a codec type;
    // the default build pins `JsonCodec`.
    #[tokio::test]
    async fn test_builder_binds_without_type_annotations() {
        let server = PairwireServerBuilder::new()
            .bind("127.0.0.1:0")
            .build()
            .await
            .expect("bind failed");
        let addr = server.local_addr().expect("no local addr");
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_builder_default_matches_new() {
        let builder = PairwireServerBuilder::default();
        let server = builder.bind("127.0.0.1:0").build().await.expect("bind failed");
        assert!(server.local_addr().is_ok());
    }
}
