use super::*;

use std::net::SocketAddr;
use std::time::Duration;

use axum::routing::get;
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

pub(crate) type WsClient =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

pub(crate) fn build_ws_state() -> Arc<WsState> {
    let authority = Arc::new(StateAuthority::new());
    let connections = Arc::new(ConnectionRegistry::new());
    Arc::new(WsState::new(authority, connections))
}

pub(crate) async fn spawn_ws_server(
    state: Arc<WsState>,
) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let router = axum::Router::new().route("/ws", get(ws_handler).with_state(state));

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, handle)
}

pub(crate) async fn ws_connect(addr: SocketAddr) -> WsClient {
    let url = format!("ws://{}/ws", addr);
    let (ws, _resp) = connect_async(url).await.unwrap();
    ws
}

pub(crate) async fn ws_send(ws: &mut WsClient, event: &RealtimeEvent) {
    let json = serde_json::to_string(event).unwrap();
    ws.send(WsMessage::Text(json)).await.unwrap();
}

pub(crate) async fn ws_send_raw(ws: &mut WsClient, raw: &str) {
    ws.send(WsMessage::Text(raw.to_string())).await.unwrap();
}

pub(crate) async fn ws_recv_event(ws: &mut WsClient) -> RealtimeEvent {
    loop {
        let msg = ws.next().await.unwrap().unwrap();
        match msg {
            WsMessage::Text(text) => {
                return serde_json::from_str::<RealtimeEvent>(&text).unwrap();
            }
            _ => {}
        }
    }
}

pub(crate) async fn ws_expect_message<F>(
    ws: &mut WsClient,
    timeout: Duration,
    mut predicate: F,
) -> RealtimeEvent
where
    F: FnMut(&RealtimeEvent) -> bool,
{
    tokio::time::timeout(timeout, async {
        loop {
            let event = ws_recv_event(ws).await;
            if predicate(&event) {
                return event;
            }
        }
    })
    .await
    .unwrap()
}

pub(crate) async fn ws_expect_no_message_matching<F>(
    ws: &mut WsClient,
    timeout: Duration,
    mut predicate: F,
) where
    F: FnMut(&RealtimeEvent) -> bool,
{
    let result = tokio::time::timeout(timeout, async {
        loop {
            let event = ws_recv_event(ws).await;
            if predicate(&event) {
                return event;
            }
        }
    })
    .await;

    if let Ok(event) = result {
        panic!("Expected no matching message, but received: {event:?}");
    }
}
