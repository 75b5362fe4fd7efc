//! Unified error type for the pairwire server.

use pairwire_core::CoreError;
use pairwire_protocol::ProtocolError;
use pairwire_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `pairwire` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PairwireError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A pairing-level error (peer already housed, self-pairing).
    #[error(transparent)]
    Core(#[from] CoreError),
}
