//! Room store: owns every live room, in insertion order.

use pairwire_protocol::{PeerId, RoomId};

use crate::Room;

/// The in-memory collection of rooms.
///
/// Rooms are kept in a `Vec` in creation order, which gives the
/// deterministic tie-break the matchmaker relies on: the oldest open
/// room wins. Room ids come from a store-local counter, not a global —
/// the store is passed explicitly to whoever mutates it, so tests get
/// isolated, reproducible instances.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: Vec<Room>,
    next_room_id: u64,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The room where `peer` occupies either slot, if any.
    pub fn find_room_containing(&self, peer: PeerId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.contains(peer))
    }

    pub(crate) fn find_room_containing_mut(&mut self, peer: PeerId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.contains(peer))
    }

    /// The oldest open room whose waiting occupant is not `excluding`.
    ///
    /// The exclusion is the self-pairing guard: a peer must never be
    /// matched against a room it is already waiting in.
    pub fn find_first_open_room(&self, excluding: PeerId) -> Option<&Room> {
        self.rooms
            .iter()
            .find(|r| r.is_open() && !r.contains(excluding))
    }

    pub(crate) fn find_first_open_room_mut(&mut self, excluding: PeerId) -> Option<&mut Room> {
        self.rooms
            .iter_mut()
            .find(|r| r.is_open() && !r.contains(excluding))
    }

    /// Allocates a fresh room with `first` in the primary slot.
    pub(crate) fn create_room(&mut self, first: PeerId) -> RoomId {
        self.next_room_id += 1;
        let id = RoomId(self.next_room_id);
        self.rooms.push(Room::new(id, first));
        tracing::info!(room_id = %id, peer = %first, "room created");
        id
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id() == id)
    }

    pub(crate) fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.id() == id)
    }

    /// Deletes the room. No-op if absent.
    pub fn remove_room(&mut self, id: RoomId) {
        let before = self.rooms.len();
        self.rooms.retain(|r| r.id() != id);
        if self.rooms.len() < before {
            tracing::info!(room_id = %id, "room removed");
        }
    }

    /// Removes every room with both slots vacant. Returns how many
    /// were reclaimed.
    pub(crate) fn reap_empty_rooms(&mut self) -> usize {
        let before = self.rooms.len();
        self.rooms.retain(|r| !r.is_empty());
        let reaped = before - self.rooms.len();
        if reaped > 0 {
            tracing::debug!(reaped, "reaped empty rooms");
        }
        reaped
    }

    /// Ids of all open rooms, oldest first.
    pub fn open_room_ids(&self) -> Vec<RoomId> {
        self.rooms
            .iter()
            .filter(|r| r.is_open())
            .map(|r| r.id())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }
}
