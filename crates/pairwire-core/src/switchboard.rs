//! The switchboard: pairs peers, handles departures, relays payloads.
//!
//! All mutation goes through `&mut self`, so a caller that serializes
//! access (the server keeps one switchboard behind one mutex) gets the
//! atomicity the room invariants need for free. Rematching after a
//! disconnect is deliberately queued and drained *after* the primary
//! mutation completes — never re-entrant, never mutating the store
//! while scanning it.

use std::collections::VecDeque;

use pairwire_protocol::{PeerId, Role, RoomId, ServerEvent};

use crate::{CoreError, Gateway, RoomStore};

/// Which kind of opaque payload a peer asked to have forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayKind {
    /// Connectivity-establishment candidate (ICE).
    Candidate,
    /// Session description (SDP offer/answer).
    SessionDescription,
    /// Presence/status toggle (e.g., camera on/off).
    StatusToggle,
}

/// Prefix recipients see on relayed chat lines. The sender's own
/// client renders its local "You: " copy; the wire only ever carries
/// the counterpart's view.
const CHAT_PREFIX: &str = "Stranger: ";

/// Matchmaking and relay engine over an owned [`RoomStore`].
pub struct Switchboard<G: Gateway> {
    store: RoomStore,
    gateway: G,
    /// Survivors awaiting a rematch attempt, processed after the
    /// disconnect mutation that orphaned them has fully settled.
    pending_rematch: VecDeque<PeerId>,
}

impl<G: Gateway> Switchboard<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            store: RoomStore::new(),
            gateway,
            pending_rematch: VecDeque::new(),
        }
    }

    /// Handles a pairing request from `peer`.
    ///
    /// Joins the oldest open room, or creates a new one when nobody is
    /// waiting. Idempotent: a duplicate request from a peer already in
    /// a room re-emits its room id and returns its existing role
    /// without touching the store.
    ///
    /// # Errors
    /// Only on invariant violations ([`CoreError`]); the store is left
    /// consistent when one is returned.
    pub fn on_connect(&mut self, peer: PeerId) -> Result<Role, CoreError> {
        if let Some((room_id, role)) = self
            .store
            .find_room_containing(peer)
            .and_then(|r| r.role_of(peer).map(|role| (r.id(), role)))
        {
            tracing::debug!(%peer, %room_id, "duplicate start, re-emitting room id");
            self.gateway.notify(peer, ServerEvent::RoomAssigned { room_id });
            return Ok(role);
        }

        if let Some(role) = self.try_pair(peer)? {
            return Ok(role);
        }

        let room_id = self.store.create_room(peer);
        self.gateway.notify(peer, ServerEvent::RoomAssigned { room_id });
        Ok(Role::Primary)
    }

    /// Handles the loss of `peer`'s connection.
    ///
    /// Notifies the counterpart (if any), frees the slot, attempts to
    /// rematch the survivor, reaps empty rooms, and finally merges any
    /// still-separately-waiting singletons. Idempotent: a second
    /// disconnect for the same peer finds no room and no-ops.
    pub fn on_disconnect(&mut self, peer: PeerId) {
        let Some(room) = self.store.find_room_containing_mut(peer) else {
            tracing::debug!(%peer, "disconnect for a peer in no room");
            return;
        };
        let room_id = room.id();
        let survivor = room.vacate(peer);
        tracing::info!(%peer, %room_id, survivor = ?survivor, "peer left room");

        if let Some(survivor) = survivor {
            self.gateway.notify(survivor, ServerEvent::PeerDisconnected);
            self.pending_rematch.push_back(survivor);
        }

        self.store.reap_empty_rooms();
        self.drain_rematch_queue();
        self.sweep_open_rooms();
    }

    /// Forwards an opaque payload from `sender` to its counterpart.
    ///
    /// An unpaired or unknown sender is dropped silently — by design,
    /// not an error: the client may simply have raced its counterpart's
    /// disconnect.
    pub fn relay(&self, sender: PeerId, kind: RelayKind, payload: serde_json::Value) {
        let Some(room) = self.store.find_room_containing(sender) else {
            tracing::debug!(%sender, ?kind, "relay from a peer in no room, dropped");
            return;
        };
        let Some(counterpart) = room.counterpart(sender) else {
            tracing::debug!(%sender, ?kind, "relay while unpaired, dropped");
            return;
        };

        let event = match kind {
            RelayKind::Candidate => ServerEvent::Candidate { payload, from: sender },
            RelayKind::SessionDescription => {
                ServerEvent::SessionDescription { payload, from: sender }
            }
            RelayKind::StatusToggle => ServerEvent::StatusToggle { payload, from: sender },
        };
        self.gateway.notify(counterpart, event);
    }

    /// Broadcasts a chat line from `sender` to the rest of its room.
    ///
    /// The text is never interpreted, only prefixed for display. The
    /// client-declared role and room id are advisory: the true room is
    /// resolved from the store, and a mismatch is only logged.
    pub fn chat(&self, sender: PeerId, text: &str, declared_role: Role, declared_room: RoomId) {
        let Some(room) = self.store.find_room_containing(sender) else {
            tracing::debug!(%sender, "chat from a peer in no room, dropped");
            return;
        };
        if room.id() != declared_room {
            tracing::debug!(
                %sender, declared = %declared_room, actual = %room.id(),
                "chat declared a stale room id"
            );
        }
        if room.role_of(sender) != Some(declared_role) {
            tracing::debug!(%sender, %declared_role, "chat declared a mismatched role");
        }
        if room.counterpart(sender).is_none() {
            tracing::debug!(%sender, "chat while unpaired, dropped");
            return;
        }

        let event = ServerEvent::Chat {
            text: format!("{CHAT_PREFIX}{text}"),
        };
        self.gateway.broadcast_to_room(room, sender, event);
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.store.len()
    }

    /// The room `peer` currently occupies, if any.
    pub fn peer_room(&self, peer: PeerId) -> Option<RoomId> {
        self.store.find_room_containing(peer).map(|r| r.id())
    }

    // -- internals ---------------------------------------------------------

    /// Joins `joiner` into the oldest open room, if one exists.
    fn try_pair(&mut self, joiner: PeerId) -> Result<Option<Role>, CoreError> {
        // A joiner reaching this point must be unhoused; anything else
        // means events interleaved in a way the contract forbids.
        if let Some(existing) = self.store.find_room_containing(joiner) {
            let room_id = existing.id();
            debug_assert!(false, "{joiner} already occupies {room_id}");
            return Err(CoreError::AlreadyHoused(joiner, room_id));
        }

        let Some(room) = self.store.find_first_open_room_mut(joiner) else {
            return Ok(None);
        };
        let room_id = room.id();
        let Some((waiting, _)) = room.solo_occupant() else {
            return Ok(None);
        };
        let Some(role) = room.admit(joiner) else {
            debug_assert!(false, "open room {room_id} refused {joiner}");
            return Err(CoreError::SelfPaired(room_id, joiner));
        };

        tracing::info!(%room_id, %joiner, %waiting, "peers paired");
        self.gateway.notify(waiting, ServerEvent::PeerMatched { peer: joiner });
        self.gateway.notify(joiner, ServerEvent::PeerMatched { peer: waiting });
        self.gateway.notify(joiner, ServerEvent::RoomAssigned { room_id });
        Ok(Some(role))
    }

    /// Processes queued rematch attempts, oldest first.
    ///
    /// A queued survivor may already have been rehoused by an earlier
    /// merge, or may itself have disconnected before we got here; both
    /// cases are skipped. Liveness is checked so we never burn a
    /// waiting room on a peer whose own disconnect is still in flight.
    fn drain_rematch_queue(&mut self) {
        while let Some(waiting) = self.pending_rematch.pop_front() {
            if !self.gateway.is_live(waiting) {
                tracing::debug!(peer = %waiting, "skipping rematch for unreachable peer");
                continue;
            }
            let Some(source_id) = self.store.find_room_containing(waiting).map(|r| r.id()) else {
                continue;
            };
            let Some(target_id) = self.store.find_first_open_room(waiting).map(|r| r.id()) else {
                continue;
            };
            if let Err(e) = self.merge_into(target_id, waiting, source_id) {
                tracing::error!(error = %e, peer = %waiting, "rematch aborted");
            }
        }
    }

    /// Merges any remaining pairs of open rooms, oldest two first.
    ///
    /// Covers two singleton waiters that existed concurrently without
    /// either one's arrival triggering the other's matchmaking path.
    fn sweep_open_rooms(&mut self) {
        let mut previous = usize::MAX;
        loop {
            let open = self.store.open_room_ids();
            if open.len() < 2 || open.len() >= previous {
                break;
            }
            previous = open.len();

            let (target_id, source_id) = (open[0], open[1]);
            let Some((mover, _)) = self.store.room(source_id).and_then(|r| r.solo_occupant())
            else {
                break;
            };
            if let Err(e) = self.merge_into(target_id, mover, source_id) {
                tracing::error!(error = %e, "open-room sweep aborted");
                break;
            }
        }
    }

    /// Moves the waiting `mover` out of `source_id` into the free slot
    /// of `target_id`, notifying both occupants of their merged room.
    fn merge_into(
        &mut self,
        target_id: RoomId,
        mover: PeerId,
        source_id: RoomId,
    ) -> Result<(), CoreError> {
        let Some((host, _)) = self.store.room(target_id).and_then(|r| r.solo_occupant()) else {
            return Ok(()); // target stopped being open; nothing to merge
        };
        if host == mover {
            debug_assert!(false, "merge would pair {mover} with itself");
            return Err(CoreError::SelfPaired(target_id, mover));
        }

        if let Some(source) = self.store.room_mut(source_id) {
            source.vacate(mover);
        }
        // Verified open with a different host above; admit cannot refuse.
        if let Some(target) = self.store.room_mut(target_id) {
            target.admit(mover);
        }
        self.store.reap_empty_rooms();

        for (to, other) in [(host, mover), (mover, host)] {
            self.gateway.notify(to, ServerEvent::PeerMatched { peer: other });
            self.gateway.notify(to, ServerEvent::RoomAssigned { room_id: target_id });
        }
        tracing::info!(room_id = %target_id, %host, %mover, "waiting peers merged");
        Ok(())
    }
}
