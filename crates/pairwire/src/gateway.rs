//! `ChannelGateway`: delivers server events to connected peers over
//! per-connection mpsc channels.
//!
//! The matchmaking engine is synchronous and knows nothing about sockets.
//! This gateway bridges the gap: each connection handler registers an
//! unbounded sender under its `PeerId`, and a writer task on the other
//! end pumps queued events onto the WebSocket. `notify` is therefore
//! non-blocking and safe to call while the engine lock is held.

use std::collections::HashMap;
use std::sync::Mutex;

use pairwire_core::Gateway;
use pairwire_protocol::{PeerId, ServerEvent};
use tokio::sync::mpsc;

/// Registry of live peers and their outbound event queues.
///
/// Uses a `std::sync::Mutex` (not tokio's): the critical sections are
/// plain map operations and never await.
#[derive(Default)]
pub struct ChannelGateway {
    peers: Mutex<HashMap<PeerId, mpsc::UnboundedSender<ServerEvent>>>,
}

impl ChannelGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a peer's outbound queue. Overwrites any previous
    /// registration for the same id.
    pub fn register(&self, peer: PeerId, sender: mpsc::UnboundedSender<ServerEvent>) {
        let mut peers = self.peers.lock().unwrap_or_else(|e| e.into_inner());
        if peers.insert(peer, sender).is_some() {
            tracing::warn!(%peer, "replaced existing outbound channel");
        }
    }

    /// Removes a peer's outbound queue. Dropping the sender ends the
    /// peer's writer task.
    pub fn unregister(&self, peer: PeerId) {
        let mut peers = self.peers.lock().unwrap_or_else(|e| e.into_inner());
        peers.remove(&peer);
    }

    /// Number of currently registered peers.
    pub fn online(&self) -> usize {
        let peers = self.peers.lock().unwrap_or_else(|e| e.into_inner());
        peers.len()
    }

    /// Sends an event to every registered peer.
    pub fn broadcast_all(&self, event: ServerEvent) {
        let peers = self.peers.lock().unwrap_or_else(|e| e.into_inner());
        for sender in peers.values() {
            let _ = sender.send(event.clone());
        }
    }
}

impl Gateway for ChannelGateway {
    fn notify(&self, peer: PeerId, event: ServerEvent) {
        let peers = self.peers.lock().unwrap_or_else(|e| e.into_inner());
        match peers.get(&peer) {
            Some(sender) => {
                // Send fails only if the writer task already exited;
                // the disconnect path will clean the peer up shortly.
                let _ = sender.send(event);
            }
            None => {
                tracing::debug!(%peer, "dropping event for unregistered peer");
            }
        }
    }

    fn is_live(&self, peer: PeerId) -> bool {
        let peers = self.peers.lock().unwrap_or_else(|e| e.into_inner());
        peers.get(&peer).is_some_and(|s| !s.is_closed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairwire_protocol::Role;

    #[test]
    fn test_notify_reaches_registered_peer() {
        let gateway = ChannelGateway::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        gateway.register(PeerId(1), tx);

        gateway.notify(
            PeerId(1),
            ServerEvent::RoleAssigned {
                role: Role::Primary,
            },
        );

        assert!(matches!(
            rx.try_recv(),
            Ok(ServerEvent::RoleAssigned {
                role: Role::Primary
            })
        ));
    }

    #[test]
    fn test_notify_unregistered_peer_is_noop() {
        let gateway = ChannelGateway::new();
        gateway.notify(PeerId(99), ServerEvent::PeerDisconnected);
    }

    #[test]
    fn test_is_live_tracks_registration() {
        let gateway = ChannelGateway::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        assert!(!gateway.is_live(PeerId(1)));
        gateway.register(PeerId(1), tx);
        assert!(gateway.is_live(PeerId(1)));
        gateway.unregister(PeerId(1));
        assert!(!gateway.is_live(PeerId(1)));
    }

    #[test]
    fn test_is_live_false_after_receiver_dropped() {
        let gateway = ChannelGateway::new();
        let (tx, rx) = mpsc::unbounded_channel();
        gateway.register(PeerId(1), tx);
        drop(rx);
        assert!(!gateway.is_live(PeerId(1)));
    }

    #[test]
    fn test_broadcast_all_hits_every_peer() {
        let gateway = ChannelGateway::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        gateway.register(PeerId(1), tx1);
        gateway.register(PeerId(2), tx2);

        gateway.broadcast_all(ServerEvent::Online { count: 2 });

        assert!(matches!(
            rx1.try_recv(),
            Ok(ServerEvent::Online { count: 2 })
        ));
        assert!(matches!(
            rx2.try_recv(),
            Ok(ServerEvent::Online { count: 2 })
        ));
    }

    #[test]
    fn test_online_counts_registered_peers() {
        let gateway = ChannelGateway::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        gateway.register(PeerId(1), tx1);
        gateway.register(PeerId(2), tx2);
        assert_eq!(gateway.online(), 2);
        gateway.unregister(PeerId(1));
        assert_eq!(gateway.online(), 1);
    }
}
