//! Wire protocol for Pairwire.
//!
//! This crate defines the "language" that signaling clients and the
//! server speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`Role`], identity
//!   newtypes) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! The protocol layer sits between transport (raw bytes) and the
//! pairing core (room bookkeeping). It knows nothing about rooms or
//! connections — it only serializes and deserializes events. SDP and
//! ICE payloads are deliberately opaque `serde_json::Value`s: the
//! relay never interprets what it forwards.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ClientEvent, PeerId, Role, RoomId, ServerEvent};
