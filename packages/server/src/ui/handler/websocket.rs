//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::RoomId,
    infrastructure::dto::websocket::ClientMessage,
    ui::state::AppState,
    usecase::{ClientIntent, ConnectionSession, IntentError},
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub room: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let room_id = match query.room {
        Some(room) => match RoomId::try_from(room.clone()) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Invalid room id '{}': {}", room, e);
                return Err(StatusCode::BAD_REQUEST);
            }
        },
        None => state.default_room.clone(),
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, room_id)))
}

/// Spawns a task that drains this connection's outbound queue into the WebSocket sink.
///
/// The task ends when the queue is closed (the connection was unregistered)
/// or the socket can no longer be written to.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, room_id: RoomId) {
    let (sender, mut receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel();
    let mut session = state.coordinator.connect(room_id, tx).await;
    let mut send_task = pusher_loop(rx, sender);

    // If either side completes, the connection is over. Dropping receive_loop
    // mid-intent is safe: disconnect waits for the interrupted intent.
    tokio::select! {
        _ = receive_loop(&state, &mut session, &mut receiver) => send_task.abort(),
        _ = &mut send_task => {}
    };

    // Transport failure or close degrades to disconnect
    state.coordinator.disconnect(&mut session).await;
}

async fn receive_loop(
    state: &AppState,
    session: &mut ConnectionSession,
    receiver: &mut SplitStream<WebSocket>,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(
                    "WebSocket error on connection '{}': {}",
                    session.connection_id(),
                    e
                );
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                tracing::debug!(
                    "Received from connection '{}': {}",
                    session.connection_id(),
                    text.as_str()
                );
                handle_text(state, session, text.as_str()).await;
            }
            Message::Ping(_) => {
                tracing::trace!("Received ping");
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            Message::Close(_) => {
                tracing::info!(
                    "Connection '{}' requested close",
                    session.connection_id()
                );
                break;
            }
            _ => {}
        }
    }
}

/// Parse one text frame into an intent and hand it to the coordinator.
async fn handle_text(state: &AppState, session: &mut ConnectionSession, text: &str) {
    let intent = serde_json::from_str::<ClientMessage>(text)
        .map_err(|e| IntentError::Malformed(format!("unparseable message: {}", e)))
        .and_then(ClientIntent::try_from);

    let result = match intent {
        Ok(intent) => state.coordinator.handle(session, intent).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        state.coordinator.reject(session, &e).await;
    }
}
