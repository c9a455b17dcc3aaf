//! Connection management for WebSocket clients.
//!
//! Tracks connected surfaces and their declared role, and fans messages
//! out to all of them or all-except-sender.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use stagewire_protocol::{ClientRole, RealtimeEvent};

/// A connection's declared identity.
///
/// Every connection starts out unidentified; a `client_identify` event
/// upgrades it to the declared role. Multiple connections may share a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionRole {
    /// No `client_identify` received yet
    Unidentified,
    /// A control surface
    Remote,
    /// The presentation surface
    Stage,
}

impl From<ClientRole> for ConnectionRole {
    fn from(role: ClientRole) -> Self {
        match role {
            ClientRole::Remote => ConnectionRole::Remote,
            ClientRole::Stage => ConnectionRole::Stage,
        }
    }
}

/// Information about a connected client.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Unique ID for this connection
    pub connection_id: Uuid,
    /// Declared role
    pub role: ConnectionRole,
}

/// A frame queued for delivery to one connection.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// A protocol event, serialized as a JSON text frame
    Event(RealtimeEvent),
    /// A transport-level liveness probe
    Ping,
}

/// Manages all active WebSocket connections.
pub struct ConnectionRegistry {
    /// Map of connection_id -> (ConnectionInfo, sender channel)
    connections: RwLock<HashMap<Uuid, (ConnectionInfo, mpsc::Sender<Outbound>)>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection with role [`ConnectionRole::Unidentified`].
    pub async fn register(&self, connection_id: Uuid, sender: mpsc::Sender<Outbound>) {
        let info = ConnectionInfo {
            connection_id,
            role: ConnectionRole::Unidentified,
        };
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, (info, sender));
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Unregister a connection.
    pub async fn unregister(&self, connection_id: Uuid) {
        let mut connections = self.connections.write().await;
        if connections.remove(&connection_id).is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
    }

    /// Get connection info by ID.
    pub async fn get(&self, connection_id: Uuid) -> Option<ConnectionInfo> {
        let connections = self.connections.read().await;
        connections.get(&connection_id).map(|(info, _)| info.clone())
    }

    /// Number of currently open connections.
    pub async fn count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Set a connection's role. Re-identification overwrites the old role.
    pub async fn identify(
        &self,
        connection_id: Uuid,
        role: ConnectionRole,
    ) -> Result<(), ConnectionError> {
        let mut connections = self.connections.write().await;
        if let Some((info, _)) = connections.get_mut(&connection_id) {
            info.role = role;
            tracing::info!(connection_id = %connection_id, role = ?role, "Client identified");
            Ok(())
        } else {
            Err(ConnectionError::NotFound)
        }
    }

    /// Send a frame to one connection.
    pub async fn send_to(&self, connection_id: Uuid, frame: Outbound) {
        let connections = self.connections.read().await;
        if let Some((info, sender)) = connections.get(&connection_id) {
            if let Err(e) = sender.try_send(frame) {
                tracing::warn!(
                    connection_id = %info.connection_id,
                    error = %e,
                    "Failed to send to connection"
                );
            }
        }
    }

    /// Broadcast an event to every open connection.
    ///
    /// A failed send to one peer is logged and skipped so the rest of the
    /// fan-out still goes through.
    pub async fn broadcast_all(&self, event: RealtimeEvent) {
        let connections = self.connections.read().await;
        for (info, sender) in connections.values() {
            if let Err(e) = sender.try_send(Outbound::Event(event.clone())) {
                tracing::warn!(
                    connection_id = %info.connection_id,
                    error = %e,
                    "Failed to broadcast message"
                );
            }
        }
    }

    /// Broadcast an event to every open connection except `sender_id`.
    pub async fn broadcast_except(&self, event: RealtimeEvent, sender_id: Uuid) {
        let connections = self.connections.read().await;
        for (info, sender) in connections.values() {
            if info.connection_id == sender_id {
                continue;
            }
            if let Err(e) = sender.try_send(Outbound::Event(event.clone())) {
                tracing::warn!(
                    connection_id = %info.connection_id,
                    error = %e,
                    "Failed to relay message"
                );
            }
        }
    }

    /// Queue a transport ping on every open connection.
    pub async fn ping_all(&self) {
        let connections = self.connections.read().await;
        for (info, sender) in connections.values() {
            if let Err(e) = sender.try_send(Outbound::Ping) {
                tracing::warn!(
                    connection_id = %info.connection_id,
                    error = %e,
                    "Failed to queue ping"
                );
            }
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur during connection operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConnectionError {
    #[error("Connection not found")]
    NotFound,
}
