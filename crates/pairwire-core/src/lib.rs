//! Matchmaking and room-lifecycle engine for Pairwire.
//!
//! This crate is the heart of the signaling relay: it assigns arriving
//! peers to two-party rooms, rematches the survivor when one side of a
//! pair leaves, reclaims empty rooms, and resolves the counterpart a
//! relayed payload should be forwarded to.
//!
//! It holds no network state. Everything outward-facing goes through
//! the [`Gateway`] trait, which the server crate implements over real
//! connections and tests implement with a recording mock — so the whole
//! engine is unit-testable without a socket in sight.
//!
//! # Key types
//!
//! - [`Switchboard`] — connect/disconnect/relay entry points
//! - [`RoomStore`] — owns all [`Room`]s, insertion-ordered
//! - [`Occupancy`] — tagged room state (`Empty`/`Solo`/`Paired`)
//! - [`Gateway`] — the seam to the transport layer
//!
//! # Concurrency
//!
//! The engine is deliberately synchronous and single-threaded: every
//! operation is non-yielding, in-memory, and bounded by the current
//! room count. Callers serialize mutations (the server holds it behind
//! one mutex), which is what the room invariants rely on.

mod error;
mod gateway;
mod room;
mod store;
mod switchboard;

pub use error::CoreError;
pub use gateway::Gateway;
pub use room::{Occupancy, Room};
pub use store::RoomStore;
pub use switchboard::{RelayKind, Switchboard};
