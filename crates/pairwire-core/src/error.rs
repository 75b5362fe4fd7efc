//! Error types for the pairing engine.

use pairwire_protocol::{PeerId, RoomId};

/// Invariant violations inside the engine.
///
/// These are unreachable under correct event sequencing — an unpaired
/// relay or an unknown disconnect is a silent no-op, not an error. When
/// one of these *is* produced, processing of the offending event stops
/// and the store is left otherwise consistent (empty rooms reaped).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A peer that should be unhoused already occupies a room.
    #[error("{0} already occupies {1}")]
    AlreadyHoused(PeerId, RoomId),

    /// A room would end up holding the same peer in both slots.
    #[error("room {0} would pair {1} with itself")]
    SelfPaired(RoomId, PeerId),
}
