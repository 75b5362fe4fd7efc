//! Per-connection handler: registration, event routing, and teardown.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register an outbound event queue with the gateway
//!   2. Spawn a writer task pumping queued events onto the socket
//!   3. Loop: receive frames → decode → dispatch to the switchboard
//!   4. On exit: unregister, run the disconnect flow, update presence

use std::sync::Arc;

use pairwire_core::{Gateway, RelayKind};
use pairwire_protocol::{ClientEvent, Codec, PeerId, ServerEvent};
use pairwire_transport::{Connection, WebSocketConnection};

use crate::PairwireError;
use crate::server::ServerState;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), PairwireError>
where
    C: Codec + Clone + Send + Sync + 'static,
{
    let peer = PeerId(conn.id().into_inner());
    tracing::debug!(%peer, "handling new connection");

    let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
    state.gateway.register(peer, sender);
    announce_presence(&state);

    let conn = Arc::new(conn);
    let writer = tokio::spawn(pump_outbound(
        Arc::clone(&conn),
        state.codec.clone(),
        peer,
        receiver,
    ));

    read_loop(&conn, &state, peer).await;

    // Unregister before the disconnect flow so the rematch queue sees
    // this peer as gone.
    state.gateway.unregister(peer);
    {
        let mut switchboard = state.switchboard.lock().await;
        switchboard.on_disconnect(peer);
    }
    announce_presence(&state);

    // The writer ends on its own once the gateway drops our sender.
    let _ = writer.await;
    let _ = conn.close().await;
    Ok(())
}

/// Drains the peer's event queue onto the socket until the queue closes
/// or a send fails.
async fn pump_outbound<C: Codec>(
    conn: Arc<WebSocketConnection>,
    codec: C,
    peer: PeerId,
    mut receiver: tokio::sync::mpsc::UnboundedReceiver<ServerEvent>,
) {
    while let Some(event) = receiver.recv().await {
        let bytes = match codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(%peer, error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%peer, error = %e, "outbound send failed");
            break;
        }
    }
}

/// Receives frames until the connection closes or errors. Malformed
/// frames are logged and skipped; the connection stays up.
async fn read_loop<C>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<C>>,
    peer: PeerId,
) where
    C: Codec,
{
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%peer, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%peer, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%peer, error = %e, "failed to decode client event");
                continue;
            }
        };

        dispatch(state, peer, event).await;
    }
}

/// Routes one decoded client event into the switchboard.
async fn dispatch<C: Codec>(state: &Arc<ServerState<C>>, peer: PeerId, event: ClientEvent) {
    match event {
        ClientEvent::Start => {
            let result = {
                let mut switchboard = state.switchboard.lock().await;
                switchboard.on_connect(peer)
            };
            match result {
                Ok(role) => {
                    state.gateway.notify(peer, ServerEvent::RoleAssigned { role });
                }
                Err(e) => {
                    tracing::error!(%peer, error = %e, "pairing failed");
                }
            }
        }

        ClientEvent::Candidate { payload } => {
            let switchboard = state.switchboard.lock().await;
            switchboard.relay(peer, RelayKind::Candidate, payload);
        }

        ClientEvent::SessionDescription { payload } => {
            let switchboard = state.switchboard.lock().await;
            switchboard.relay(peer, RelayKind::SessionDescription, payload);
        }

        ClientEvent::StatusToggle { payload } => {
            let switchboard = state.switchboard.lock().await;
            switchboard.relay(peer, RelayKind::StatusToggle, payload);
        }

        ClientEvent::Chat {
            text,
            role,
            room_id,
        } => {
            let switchboard = state.switchboard.lock().await;
            switchboard.chat(peer, &text, role, room_id);
        }
    }
}

/// Broadcasts the current peer count to everyone connected.
fn announce_presence<C: Codec>(state: &ServerState<C>) {
    let count = state.gateway.online();
    state.gateway.broadcast_all(ServerEvent::Online { count });
}
