//! Pairwire signaling server binary.
//!
//! Binds to `PAIRWIRE_ADDR` (default `127.0.0.1:4000`) and serves the
//! WebSocket signaling protocol. Log verbosity follows `RUST_LOG`.

use pairwire::{PairwireError, PairwireServerBuilder};

#[tokio::main]
async fn main() -> Result<(), PairwireError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let addr = std::env::var("PAIRWIRE_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:4000".to_string());

    let server = PairwireServerBuilder::new().bind(&addr).build().await?;
    tracing::info!(%addr, "pairwire signaling server listening");
    server.run().await
}
