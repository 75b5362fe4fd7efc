//! The seam between the pairing engine and the transport layer.

use pairwire_protocol::{PeerId, ServerEvent};

use crate::Room;

/// Outbound delivery and liveness, as seen by the core.
///
/// The engine never touches sockets: it asks the gateway to deliver
/// events and, before an automatic rematch, whether a peer is still
/// actually reachable. The server crate implements this over per-peer
/// channels; tests implement it with a recording mock.
pub trait Gateway {
    /// Delivers one event to one specific peer.
    ///
    /// Delivery to a peer that is already gone is silently dropped —
    /// its own disconnect event will clean up the room state.
    fn notify(&self, peer: PeerId, event: ServerEvent);

    /// Delivers an event to every occupant of `room` except `excluding`.
    fn broadcast_to_room(&self, room: &Room, excluding: PeerId, event: ServerEvent) {
        for occupant in room.occupants() {
            if occupant != excluding {
                self.notify(occupant, event.clone());
            }
        }
    }

    /// Whether `peer` is still connected. Consulted only to decide if
    /// an automatic rematch attempt is worth making.
    fn is_live(&self, peer: PeerId) -> bool;
}

/// A shared gateway is still a gateway. Lets the server hand the same
/// instance to the switchboard and to its connection handlers.
impl<G: Gateway + ?Sized> Gateway for std::sync::Arc<G> {
    fn notify(&self, peer: PeerId, event: ServerEvent) {
        (**self).notify(peer, event);
    }

    fn broadcast_to_room(&self, room: &Room, excluding: PeerId, event: ServerEvent) {
        (**self).broadcast_to_room(room, excluding, event);
    }

    fn is_live(&self, peer: PeerId) -> bool {
        (**self).is_live(peer)
    }
}
