//! # Pairwire
//!
//! Anonymous two-party WebRTC signaling relay.
//!
//! Pairwire matches strangers into two-party rooms over WebSockets and
//! relays their connectivity candidates, session descriptions, chat
//! lines, and status toggles. The server never inspects signaling
//! payloads; it only decides who is paired with whom.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pairwire::PairwireServerBuilder;
//!
//! # async fn run() -> Result<(), pairwire::PairwireError> {
//! let server = PairwireServerBuilder::new()
//!     .bind("0.0.0.0:4000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod gateway;
mod handler;
mod server;

pub use error::PairwireError;
pub use gateway::ChannelGateway;
pub use server::{PairwireServer, PairwireServerBuilder};
