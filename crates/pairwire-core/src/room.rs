//! Room entity and its occupancy state machine.

use pairwire_protocol::{PeerId, Role, RoomId};

/// Who is in a room.
///
/// Modeled as a tagged state rather than two nullable slots, so the
/// illegal combinations (full room with an empty slot, empty room
/// marked open) cannot be constructed at all. A room is "open" exactly
/// when it is `Solo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    /// Both slots vacant. Transient — the store reaps these.
    Empty,
    /// One occupant waiting for a counterpart, keeping the role it
    /// held when the room was last mutated.
    Solo { peer: PeerId, role: Role },
    /// Both slots taken; the room accepts no further peers.
    Paired { primary: PeerId, secondary: PeerId },
}

/// A two-party pairing room.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    occupancy: Occupancy,
}

impl Room {
    /// Creates a room holding its first arrival in the primary slot.
    pub(crate) fn new(id: RoomId, first: PeerId) -> Self {
        Self {
            id,
            occupancy: Occupancy::Solo {
                peer: first,
                role: Role::Primary,
            },
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn occupancy(&self) -> Occupancy {
        self.occupancy
    }

    /// Exactly one slot occupied — eligible for a new arrival.
    pub fn is_open(&self) -> bool {
        matches!(self.occupancy, Occupancy::Solo { .. })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.occupancy, Occupancy::Empty)
    }

    pub fn is_full(&self) -> bool {
        matches!(self.occupancy, Occupancy::Paired { .. })
    }

    pub fn contains(&self, peer: PeerId) -> bool {
        self.role_of(peer).is_some()
    }

    /// The role `peer` holds in this room, if it occupies a slot.
    pub fn role_of(&self, peer: PeerId) -> Option<Role> {
        match self.occupancy {
            Occupancy::Empty => None,
            Occupancy::Solo { peer: p, role } if p == peer => Some(role),
            Occupancy::Solo { .. } => None,
            Occupancy::Paired { primary, .. } if primary == peer => Some(Role::Primary),
            Occupancy::Paired { secondary, .. } if secondary == peer => Some(Role::Secondary),
            Occupancy::Paired { .. } => None,
        }
    }

    /// The other occupant of `peer`'s room, when both slots are taken.
    pub fn counterpart(&self, peer: PeerId) -> Option<PeerId> {
        match self.occupancy {
            Occupancy::Paired { primary, secondary } if primary == peer => Some(secondary),
            Occupancy::Paired { primary, secondary } if secondary == peer => Some(primary),
            _ => None,
        }
    }

    /// The waiting occupant of an open room.
    pub fn solo_occupant(&self) -> Option<(PeerId, Role)> {
        match self.occupancy {
            Occupancy::Solo { peer, role } => Some((peer, role)),
            _ => None,
        }
    }

    /// Current occupants, primary first.
    pub fn occupants(&self) -> Vec<PeerId> {
        match self.occupancy {
            Occupancy::Empty => Vec::new(),
            Occupancy::Solo { peer, .. } => vec![peer],
            Occupancy::Paired { primary, secondary } => vec![primary, secondary],
        }
    }

    /// Places `joiner` in the free slot of an open room, returning the
    /// role it takes (the complement of the waiting occupant's role).
    ///
    /// Returns `None` if the room is not open, or if `joiner` is the
    /// waiting occupant itself — a room must never pair a peer with
    /// itself.
    pub(crate) fn admit(&mut self, joiner: PeerId) -> Option<Role> {
        let (waiting, waiting_role) = self.solo_occupant()?;
        if waiting == joiner {
            return None;
        }
        let taken = waiting_role.opposite();
        self.occupancy = match taken {
            Role::Primary => Occupancy::Paired {
                primary: joiner,
                secondary: waiting,
            },
            Role::Secondary => Occupancy::Paired {
                primary: waiting,
                secondary: joiner,
            },
        };
        Some(taken)
    }

    /// Clears `peer`'s slot. Returns the surviving occupant, if one
    /// remains; the survivor keeps the role it already held.
    pub(crate) fn vacate(&mut self, peer: PeerId) -> Option<PeerId> {
        match self.occupancy {
            Occupancy::Solo { peer: p, .. } if p == peer => {
                self.occupancy = Occupancy::Empty;
                None
            }
            Occupancy::Paired { primary, secondary } if primary == peer => {
                self.occupancy = Occupancy::Solo {
                    peer: secondary,
                    role: Role::Secondary,
                };
                Some(secondary)
            }
            Occupancy::Paired { primary, secondary } if secondary == peer => {
                self.occupancy = Occupancy::Solo {
                    peer: primary,
                    role: Role::Primary,
                };
                Some(primary)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: u64) -> PeerId {
        PeerId(id)
    }

    #[test]
    fn test_new_room_is_open_with_primary() {
        let room = Room::new(RoomId(1), pid(10));
        assert!(room.is_open());
        assert!(!room.is_full());
        assert_eq!(room.role_of(pid(10)), Some(Role::Primary));
        assert_eq!(room.solo_occupant(), Some((pid(10), Role::Primary)));
    }

    #[test]
    fn test_admit_fills_secondary_slot() {
        let mut room = Room::new(RoomId(1), pid(10));
        let role = room.admit(pid(20));
        assert_eq!(role, Some(Role::Secondary));
        assert!(room.is_full());
        assert!(!room.is_open());
        assert_eq!(room.counterpart(pid(10)), Some(pid(20)));
        assert_eq!(room.counterpart(pid(20)), Some(pid(10)));
    }

    #[test]
    fn test_admit_rejects_self_pairing() {
        let mut room = Room::new(RoomId(1), pid(10));
        assert_eq!(room.admit(pid(10)), None);
        assert!(room.is_open());
    }

    #[test]
    fn test_admit_rejects_full_room() {
        let mut room = Room::new(RoomId(1), pid(10));
        room.admit(pid(20));
        assert_eq!(room.admit(pid(30)), None);
    }

    #[test]
    fn test_vacate_paired_leaves_survivor_with_original_role() {
        let mut room = Room::new(RoomId(1), pid(10));
        room.admit(pid(20));

        let survivor = room.vacate(pid(10));
        assert_eq!(survivor, Some(pid(20)));
        assert!(room.is_open());
        // pid(20) joined second, so it stays Secondary.
        assert_eq!(room.solo_occupant(), Some((pid(20), Role::Secondary)));
    }

    #[test]
    fn test_vacate_solo_empties_room() {
        let mut room = Room::new(RoomId(1), pid(10));
        let survivor = room.vacate(pid(10));
        assert_eq!(survivor, None);
        assert!(room.is_empty());
    }

    #[test]
    fn test_vacate_unknown_peer_is_noop() {
        let mut room = Room::new(RoomId(1), pid(10));
        room.admit(pid(20));
        assert_eq!(room.vacate(pid(99)), None);
        assert!(room.is_full());
    }

    #[test]
    fn test_admit_into_secondary_survivor_gives_primary() {
        // Survivor kept the secondary slot; a new arrival must take
        // the free primary slot.
        let mut room = Room::new(RoomId(1), pid(10));
        room.admit(pid(20));
        room.vacate(pid(10));

        let role = room.admit(pid(30));
        assert_eq!(role, Some(Role::Primary));
        assert_eq!(room.role_of(pid(20)), Some(Role::Secondary));
        assert_eq!(room.counterpart(pid(30)), Some(pid(20)));
    }

    #[test]
    fn test_occupants_order_is_primary_first() {
        let mut room = Room::new(RoomId(1), pid(10));
        room.admit(pid(20));
        assert_eq!(room.occupants(), vec![pid(10), pid(20)]);
    }

    #[test]
    fn test_counterpart_none_when_open() {
        let room = Room::new(RoomId(1), pid(10));
        assert_eq!(room.counterpart(pid(10)), None);
    }
}
