//! WebSocket client for the engine's realtime endpoint.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use stagewire_protocol::{ClientRole, RealtimeEvent};

use crate::connection::{set_connection_state, ConnectionState, ConnectionStateObserver};

/// Fixed delay between a connection loss and the next attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Buffer size for the outbound message channel.
const SEND_CHANNEL_BUFFER: usize = 32;

/// Connection manager shared by the stage and remote front ends.
///
/// Drive it with [`RealtimeClient::connect`], which runs the session and
/// its reconnect loop until [`RealtimeClient::disconnect`] is called.
/// Identification is fire-and-forget: the `client_identify` frame goes out
/// as soon as the socket opens, and inbound events reach the callback
/// whether or not the server has processed it yet.
pub struct RealtimeClient {
    url: String,
    role: ClientRole,
    state: Arc<AtomicU8>,
    tx: Arc<Mutex<Option<mpsc::Sender<RealtimeEvent>>>>,
    on_event: Arc<Mutex<Option<Box<dyn Fn(RealtimeEvent) + Send + Sync>>>>,
    on_state_change: Arc<Mutex<Option<Box<dyn Fn(ConnectionState) + Send + Sync>>>>,
    /// Set when disconnect was requested, so the loop stops instead of
    /// scheduling another attempt
    intentional_disconnect: Arc<AtomicBool>,
}

impl RealtimeClient {
    pub fn new(url: impl Into<String>, role: ClientRole) -> Self {
        Self {
            url: url.into(),
            role,
            state: Arc::new(AtomicU8::new(ConnectionState::Disconnected.to_u8())),
            tx: Arc::new(Mutex::new(None)),
            on_event: Arc::new(Mutex::new(None)),
            on_state_change: Arc::new(Mutex::new(None)),
            intentional_disconnect: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Observer handle for UI status indicators.
    pub fn observer(&self) -> ConnectionStateObserver {
        ConnectionStateObserver::new(Arc::clone(&self.state))
    }

    /// Register the inbound event callback.
    pub async fn set_on_event<F>(&self, callback: F)
    where
        F: Fn(RealtimeEvent) + Send + Sync + 'static,
    {
        let mut on_event = self.on_event.lock().await;
        *on_event = Some(Box::new(callback));
    }

    /// Register the connection-state callback.
    pub async fn set_on_state_change<F>(&self, callback: F)
    where
        F: Fn(ConnectionState) + Send + Sync + 'static,
    {
        let mut on_state_change = self.on_state_change.lock().await;
        *on_state_change = Some(Box::new(callback));
    }

    async fn set_state(&self, new_state: ConnectionState) {
        set_connection_state(&self.state, new_state);

        let callback = self.on_state_change.lock().await;
        if let Some(ref cb) = *callback {
            cb(new_state);
        }
    }

    /// Run one session: connect, identify, pump messages until the
    /// connection ends one way or another.
    async fn connect_internal(&self) -> Result<()> {
        match connect_async(&self.url).await {
            Ok((ws_stream, _)) => {
                tracing::info!(url = %self.url, role = %self.role.as_str(), "Connected to engine");
                self.set_state(ConnectionState::Connected).await;

                let (mut write, mut read) = ws_stream.split();

                // Declare our role right away; this never blocks the
                // inbound side.
                let identify = RealtimeEvent::ClientIdentify { role: self.role };
                let json = serde_json::to_string(&identify)?;
                write.send(Message::Text(json)).await?;

                let (tx, mut rx) = mpsc::channel::<RealtimeEvent>(SEND_CHANNEL_BUFFER);
                {
                    let mut tx_lock = self.tx.lock().await;
                    *tx_lock = Some(tx);
                }

                // Disconnect may have landed while the handshake was in
                // flight; honor it before pumping any frames.
                if self.intentional_disconnect.load(Ordering::SeqCst) {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                }

                // One loop owns both halves of the socket. Breaking out drops
                // them together, so the server always sees the close: either
                // the Close frame on the intentional path or the stream
                // ending on a failure.
                loop {
                    tokio::select! {
                        msg = read.next() => match msg {
                            Some(Ok(Message::Text(text))) => {
                                match serde_json::from_str::<RealtimeEvent>(&text) {
                                    Ok(event) => {
                                        let callback = self.on_event.lock().await;
                                        if let Some(ref cb) = *callback {
                                            cb(event);
                                        }
                                    }
                                    Err(e) => {
                                        tracing::warn!(error = %e, "Failed to parse server message");
                                    }
                                }
                            }
                            Some(Ok(Message::Close(_))) => {
                                tracing::info!("Server closed connection");
                                break;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                tracing::error!(error = %e, "WebSocket error");
                                break;
                            }
                            None => break,
                        },
                        event = rx.recv() => match event {
                            Some(event) => {
                                let json = match serde_json::to_string(&event) {
                                    Ok(j) => j,
                                    Err(e) => {
                                        tracing::error!(error = %e, "Failed to serialize outbound event");
                                        continue;
                                    }
                                };
                                if let Err(e) = write.send(Message::Text(json)).await {
                                    tracing::error!(error = %e, "Failed to send event");
                                    break;
                                }
                            }
                            // Disconnect cleared the sender slot: hang up
                            // cleanly so the server can release the session.
                            None => {
                                let _ = write.send(Message::Close(None)).await;
                                break;
                            }
                        },
                    }
                }

                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, url = %self.url, "Failed to connect to engine");
                Err(e.into())
            }
        }
    }

    /// Connect and stay connected.
    ///
    /// Runs until [`RealtimeClient::disconnect`] is called: after every
    /// connection loss (or failed attempt) exactly one new attempt is
    /// scheduled after [`RECONNECT_DELAY`]. Nothing is queued across
    /// sessions; clients resynchronize from the `state_sync` the engine
    /// sends on every fresh connection.
    pub async fn connect(&self) {
        self.intentional_disconnect.store(false, Ordering::SeqCst);

        loop {
            self.set_state(ConnectionState::Connecting).await;
            let result = self.connect_internal().await;

            {
                let mut tx_lock = self.tx.lock().await;
                *tx_lock = None;
            }

            if self.intentional_disconnect.load(Ordering::SeqCst) {
                self.set_state(ConnectionState::Disconnected).await;
                return;
            }

            if let Err(e) = result {
                tracing::warn!(error = %e, "Connection attempt failed");
            }

            self.set_state(ConnectionState::Reconnecting).await;
            tokio::time::sleep(RECONNECT_DELAY).await;

            if self.intentional_disconnect.load(Ordering::SeqCst) {
                self.set_state(ConnectionState::Disconnected).await;
                return;
            }

            tracing::info!("Attempting to reconnect");
        }
    }

    /// Send an event to the engine.
    ///
    /// When the socket is not open this logs and drops the event; nothing
    /// is ever queued for later delivery.
    pub async fn send(&self, event: RealtimeEvent) {
        let tx = {
            let tx_lock = self.tx.lock().await;
            tx_lock.clone()
        };
        match tx {
            Some(tx) => {
                if let Err(e) = tx.send(event).await {
                    tracing::warn!(event = ?e.0, "Connection closing, dropped outbound event");
                }
            }
            None => {
                tracing::warn!(?event, "Not connected, dropped outbound event");
            }
        }
    }

    /// Disconnect and cancel any pending reconnect attempt.
    ///
    /// Dropping the sender slot tells the live session to send a Close
    /// frame and release the socket.
    pub async fn disconnect(&self) {
        self.intentional_disconnect.store(true, Ordering::SeqCst);
        {
            let mut tx_lock = self.tx.lock().await;
            *tx_lock = None;
        }
        self.set_state(ConnectionState::Disconnected).await;
    }
}

impl Clone for RealtimeClient {
    fn clone(&self) -> Self {
        Self {
            url: self.url.clone(),
            role: self.role,
            state: Arc::clone(&self.state),
            tx: Arc::clone(&self.tx),
            on_event: Arc::clone(&self.on_event),
            on_state_change: Arc::clone(&self.on_state_change),
            intentional_disconnect: Arc::clone(&self.intentional_disconnect),
        }
    }
}
