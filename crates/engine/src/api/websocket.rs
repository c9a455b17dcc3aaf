//! WebSocket handling for stage and remote connections.
//!
//! Owns the realtime protocol's state machine: every inbound frame is
//! parsed against the closed event schema and dispatched here. Malformed
//! or unrecognized frames are dropped with a diagnostic log; the
//! connection stays open.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use stagewire_protocol::{scene_exists, RealtimeEvent};

use super::connections::{ConnectionRegistry, Outbound};
use crate::state::StateAuthority;

/// Buffer size for per-connection message channel.
const CONNECTION_CHANNEL_BUFFER: usize = 256;

/// Combined state for WebSocket handlers.
pub struct WsState {
    pub authority: Arc<StateAuthority>,
    pub connections: Arc<ConnectionRegistry>,
    /// Serializes state-mutating dispatches so the mutate-then-broadcast
    /// unit is indivisible relative to other events (the original runtime
    /// was single-threaded and got this for free).
    dispatch: Mutex<()>,
}

impl WsState {
    pub fn new(authority: Arc<StateAuthority>, connections: Arc<ConnectionRegistry>) -> Self {
        Self {
            authority,
            connections,
            dispatch: Mutex::new(()),
        }
    }
}

/// WebSocket upgrade handler - entry point for new connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = Uuid::new_v4();

    // Bounded channel for frames addressed to this client
    let (tx, mut rx) = mpsc::channel::<Outbound>(CONNECTION_CHANNEL_BUFFER);

    tracing::info!(connection_id = %connection_id, "WebSocket connection established");

    // The very first frame on every connection is a state_sync snapshot.
    // Queue it before registering, under the dispatch lock, so no
    // concurrent mutate-then-broadcast can slip in between the snapshot
    // and this connection becoming broadcast-visible.
    {
        let _guard = state.dispatch.lock().await;
        let snapshot = state.authority.snapshot().await;
        if tx
            .send(Outbound::Event(RealtimeEvent::StateSync { state: snapshot }))
            .await
            .is_err()
        {
            return;
        }
        state.connections.register(connection_id, tx.clone()).await;
    }

    // Forward queued frames to the socket
    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let message = match frame {
                Outbound::Event(event) => match serde_json::to_string(&event) {
                    Ok(json) => Message::Text(json.into()),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to serialize outbound event");
                        continue;
                    }
                },
                Outbound::Ping => Message::Ping(Vec::new().into()),
            };
            if ws_sender.send(message).await.is_err() {
                break;
            }
        }
    });

    // Handle incoming messages
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<RealtimeEvent>(&text) {
                Ok(event) => {
                    route_event(event, &state, connection_id).await;
                }
                Err(e) => {
                    // Robustness to stray input: drop the frame, keep the
                    // connection open, never answer with an error frame.
                    tracing::warn!(
                        connection_id = %connection_id,
                        error = %e,
                        "Dropping malformed frame"
                    );
                }
            },
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
            // Ping/Pong are handled at the transport level
            _ => {}
        }
    }

    // Clean up
    state.connections.unregister(connection_id).await;
    send_task.abort();

    tracing::info!(connection_id = %connection_id, "WebSocket connection terminated");
}

/// Dispatch a parsed event according to the protocol table.
async fn route_event(event: RealtimeEvent, state: &WsState, connection_id: Uuid) {
    match event {
        RealtimeEvent::ClientIdentify { role } => {
            if let Err(e) = state.connections.identify(connection_id, role.into()).await {
                tracing::warn!(connection_id = %connection_id, error = %e, "Identify failed");
            }
        }

        RealtimeEvent::SceneChange { scene_id } => {
            if !scene_exists(scene_id) {
                tracing::warn!(
                    connection_id = %connection_id,
                    scene_id,
                    "Dropping scene_change for unknown scene"
                );
                return;
            }
            apply_and_broadcast(RealtimeEvent::SceneChange { scene_id }, state, connection_id)
                .await;
            tracing::info!(scene_id, "Scene changed");
        }

        RealtimeEvent::PhraseTrigger {
            phrase_text,
            scene_id,
        } => {
            // Fire-and-forget: relayed to the other surfaces, never stored,
            // never replayed.
            tracing::info!(scene_id, phrase = %phrase_text, "Phrase triggered");
            state
                .connections
                .broadcast_except(
                    RealtimeEvent::PhraseTrigger {
                        phrase_text,
                        scene_id,
                    },
                    connection_id,
                )
                .await;
        }

        RealtimeEvent::Scene1Complete => {
            apply_and_broadcast(RealtimeEvent::Scene1Complete, state, connection_id).await;
            tracing::info!("Scene 1 complete, auto playback enabled");
        }

        RealtimeEvent::VolumeChange { volume } => {
            let clamped = volume.clamp(0.0, 1.0);
            if clamped != volume {
                tracing::debug!(volume, clamped, "Clamped out-of-range volume");
            }
            apply_and_broadcast(
                RealtimeEvent::VolumeChange { volume: clamped },
                state,
                connection_id,
            )
            .await;
            tracing::info!(volume = clamped, "Volume changed");
        }

        RealtimeEvent::Heartbeat => {
            state
                .connections
                .send_to(connection_id, Outbound::Event(RealtimeEvent::Heartbeat))
                .await;
        }

        RealtimeEvent::StateSync { .. } => {
            // Server -> client only; a client echoing one back is ignored.
            tracing::debug!(connection_id = %connection_id, "Ignoring state_sync from client");
        }

        RealtimeEvent::Unknown => {
            tracing::warn!(connection_id = %connection_id, "Dropping unrecognized event type");
        }
    }
}

/// The atomic mutate-then-broadcast unit for state-mutating events:
/// apply to the authority, relay to all-except-sender, then fan a fresh
/// `state_sync` out to everyone including the sender.
async fn apply_and_broadcast(event: RealtimeEvent, state: &WsState, connection_id: Uuid) {
    let _guard = state.dispatch.lock().await;

    let updated = state.authority.apply(&event).await;
    state.connections.broadcast_except(event, connection_id).await;
    state
        .connections
        .broadcast_all(RealtimeEvent::StateSync { state: updated })
        .await;
}

#[cfg(test)]
mod test_support;
