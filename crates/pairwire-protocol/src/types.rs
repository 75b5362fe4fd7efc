//! Core wire types for Pairwire signaling.
//!
//! Every type here has an exact JSON shape that client SDKs depend on,
//! so the serde attributes are load-bearing — see the tests at the
//! bottom for the expected formats.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque identifier for one active client connection.
///
/// Issued by the transport layer when the socket is accepted. The core
/// only ever compares these for equality — there is no ordering and no
/// meaning to the inner value.
///
/// `#[serde(transparent)]` makes `PeerId(42)` serialize as plain `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

/// Identifier for a pairing room, stable for the room's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// A peer's position within its room, by order of arrival.
///
/// Serialized as `"p1"` / `"p2"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// First arrival — the peer the room was created for.
    #[serde(rename = "p1")]
    Primary,
    /// Second arrival — the peer that filled the room.
    #[serde(rename = "p2")]
    Secondary,
}

impl Role {
    /// The role of the other slot in a two-party room.
    pub fn opposite(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "p1"),
            Self::Secondary => write!(f, "p2"),
        }
    }
}

// ---------------------------------------------------------------------------
// Client → server events
// ---------------------------------------------------------------------------

/// Events a client sends to the signaling server.
///
/// `#[serde(tag = "event")]` produces internally tagged JSON:
/// `{ "event": "start" }`, `{ "event": "candidate", "payload": ... }`.
/// The `payload` fields are opaque — ICE candidates and session
/// descriptions pass through the relay uninterpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Request pairing: join an open room or open a new one.
    Start,

    /// Connectivity-establishment candidate for the counterpart.
    Candidate { payload: serde_json::Value },

    /// Session description (offer/answer) for the counterpart.
    SessionDescription { payload: serde_json::Value },

    /// Text chat line for the rest of the room.
    ///
    /// `role` and `room_id` are what the client *believes* its
    /// position is; the server resolves the true room from its own
    /// records and only logs a mismatch.
    Chat {
        text: String,
        role: Role,
        room_id: RoomId,
    },

    /// Presence/status toggle (e.g., camera on/off), forwarded opaquely.
    StatusToggle { payload: serde_json::Value },
}

// ---------------------------------------------------------------------------
// Server → client events
// ---------------------------------------------------------------------------

/// Events the signaling server sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Reply to `start`: the role this peer holds in its room.
    RoleAssigned { role: Role },

    /// The id of the room this peer now occupies.
    RoomAssigned { room_id: RoomId },

    /// A counterpart has been found; negotiation can begin.
    PeerMatched { peer: PeerId },

    /// The counterpart left; this peer is waiting alone again.
    PeerDisconnected,

    /// Relayed connectivity candidate, tagged with its sender.
    Candidate {
        payload: serde_json::Value,
        from: PeerId,
    },

    /// Relayed session description, tagged with its sender.
    SessionDescription {
        payload: serde_json::Value,
        from: PeerId,
    },

    /// Chat line from the other occupant, already display-prefixed.
    Chat { text: String },

    /// Relayed presence/status toggle.
    StatusToggle {
        payload: serde_json::Value,
        from: PeerId,
    },

    /// Current number of live connections on the server.
    Online { count: usize },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Wire-shape tests. The client SDK parses these exact JSON forms,
    //! so a serde attribute change that alters them is a breaking bug.

    use super::*;
    use serde_json::json;

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_peer_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PeerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_peer_id_deserializes_from_plain_number() {
        let pid: PeerId = serde_json::from_str("42").unwrap();
        assert_eq!(pid, PeerId(42));
    }

    #[test]
    fn test_peer_id_display() {
        assert_eq!(PeerId(7).to_string(), "peer-7");
    }

    #[test]
    fn test_room_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&RoomId(99)).unwrap();
        assert_eq!(json, "99");
    }

    #[test]
    fn test_room_id_display() {
        assert_eq!(RoomId(3).to_string(), "room-3");
    }

    // =====================================================================
    // Role
    // =====================================================================

    #[test]
    fn test_role_serializes_as_p1_p2() {
        assert_eq!(serde_json::to_string(&Role::Primary).unwrap(), "\"p1\"");
        assert_eq!(serde_json::to_string(&Role::Secondary).unwrap(), "\"p2\"");
    }

    #[test]
    fn test_role_deserializes_from_p1_p2() {
        let r: Role = serde_json::from_str("\"p2\"").unwrap();
        assert_eq!(r, Role::Secondary);
    }

    #[test]
    fn test_role_opposite() {
        assert_eq!(Role::Primary.opposite(), Role::Secondary);
        assert_eq!(Role::Secondary.opposite(), Role::Primary);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Primary.to_string(), "p1");
        assert_eq!(Role::Secondary.to_string(), "p2");
    }

    // =====================================================================
    // ClientEvent — JSON shapes
    // =====================================================================

    #[test]
    fn test_client_event_start_json_format() {
        let json = serde_json::to_value(&ClientEvent::Start).unwrap();
        assert_eq!(json, json!({ "event": "start" }));
    }

    #[test]
    fn test_client_event_candidate_json_format() {
        let ev = ClientEvent::Candidate {
            payload: json!({ "candidate": "candidate:0 1 UDP 2122", "sdpMLineIndex": 0 }),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "candidate");
        assert_eq!(json["payload"]["sdpMLineIndex"], 0);
    }

    #[test]
    fn test_client_event_session_description_round_trip() {
        let ev = ClientEvent::SessionDescription {
            payload: json!({ "type": "offer", "sdp": "v=0..." }),
        };
        let bytes = serde_json::to_vec(&ev).unwrap();
        let decoded: ClientEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ev, decoded);
    }

    #[test]
    fn test_client_event_chat_json_format() {
        let ev = ClientEvent::Chat {
            text: "hi".into(),
            role: Role::Primary,
            room_id: RoomId(4),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "chat");
        assert_eq!(json["text"], "hi");
        assert_eq!(json["role"], "p1");
        assert_eq!(json["room_id"], 4);
    }

    #[test]
    fn test_client_event_status_toggle_round_trip() {
        let ev = ClientEvent::StatusToggle {
            payload: json!({ "isVideoOn": false }),
        };
        let bytes = serde_json::to_vec(&ev).unwrap();
        let decoded: ClientEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ev, decoded);
    }

    // =====================================================================
    // ServerEvent — JSON shapes
    // =====================================================================

    #[test]
    fn test_server_event_role_assigned_json_format() {
        let ev = ServerEvent::RoleAssigned { role: Role::Secondary };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json, json!({ "event": "role_assigned", "role": "p2" }));
    }

    #[test]
    fn test_server_event_room_assigned_json_format() {
        let ev = ServerEvent::RoomAssigned { room_id: RoomId(12) };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json, json!({ "event": "room_assigned", "room_id": 12 }));
    }

    #[test]
    fn test_server_event_peer_matched_json_format() {
        let ev = ServerEvent::PeerMatched { peer: PeerId(9) };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json, json!({ "event": "peer_matched", "peer": 9 }));
    }

    #[test]
    fn test_server_event_peer_disconnected_json_format() {
        let json = serde_json::to_value(&ServerEvent::PeerDisconnected).unwrap();
        assert_eq!(json, json!({ "event": "peer_disconnected" }));
    }

    #[test]
    fn test_server_event_candidate_carries_sender() {
        let ev = ServerEvent::Candidate {
            payload: json!({ "candidate": "..." }),
            from: PeerId(3),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "candidate");
        assert_eq!(json["from"], 3);
    }

    #[test]
    fn test_server_event_chat_round_trip() {
        let ev = ServerEvent::Chat {
            text: "Stranger: hello".into(),
        };
        let bytes = serde_json::to_vec(&ev).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ev, decoded);
    }

    #[test]
    fn test_server_event_online_round_trip() {
        let ev = ServerEvent::Online { count: 17 };
        let bytes = serde_json::to_vec(&ev).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ev, decoded);
    }

    // =====================================================================
    // Error cases — malformed input
    // =====================================================================

    #[test]
    fn test_decode_garbage_returns_error() {
        let garbage = b"not json at all";
        let result: Result<ClientEvent, _> = serde_json::from_slice(garbage);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_unknown_event_returns_error() {
        let unknown = r#"{"event": "teleport", "x": 1}"#;
        let result: Result<ClientEvent, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_missing_fields_returns_error() {
        // chat without its text field
        let wrong = r#"{"event": "chat", "role": "p1", "room_id": 1}"#;
        let result: Result<ClientEvent, _> = serde_json::from_str(wrong);
        assert!(result.is_err());
    }
}
