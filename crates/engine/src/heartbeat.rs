//! Transport-level liveness probing.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::api::ConnectionRegistry;

/// Interval between transport pings.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Spawn the heartbeat task: a Ping frame to every open connection on a
/// fixed interval, independent of the application-level `heartbeat` event.
/// Dead peers surface as send errors on their socket and get unregistered
/// by their connection task.
pub fn spawn(connections: Arc<ConnectionRegistry>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);
        // The first tick fires immediately; skip it so pings start one
        // interval after boot.
        interval.tick().await;
        loop {
            interval.tick().await;
            tracing::trace!("Pinging all connections");
            connections.ping_all().await;
        }
    })
}
