//! WebSocket client session management.
//!
//! Every session (including each reconnect) starts by sending `join` and then
//! `request-state`. Until `init-state` arrives the replica drops deltas.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use tokio::{
    net::TcpStream,
    sync::{Mutex, mpsc},
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, protocol::Message},
};

use rakugaki_server::infrastructure::dto::websocket::{
    ClientMessage, OperationPayload, ParticipantDto, PointDto, ServerMessage,
};
use rakugaki_shared::time::now_millis;

use crate::{
    command::Command,
    cursor::CursorTracker,
    error::ClientError,
    formatter::MessageFormatter,
    replica::{ApplyOutcome, CanvasReplica},
    ui::redisplay_prompt,
};

const DEFAULT_BRUSH_COLOR: &str = "#000000";
const DEFAULT_BRUSH_WIDTH: f64 = 4.0;
const ROOM_FULL_CODE: &str = "room-full";

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Connection settings for one client process
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Server WebSocket endpoint, without query string
    pub url: String,
    pub room: String,
    pub user_id: String,
    pub display_name: Option<String>,
    pub color: Option<String>,
}

impl SessionConfig {
    fn connect_url(&self) -> String {
        format!("{}?room={}", self.url, urlencoding::encode(&self.room))
    }
}

/// Client-side view of the room, kept across reconnects.
#[derive(Debug)]
pub struct ClientState {
    pub replica: CanvasReplica,
    pub cursors: CursorTracker,
    pub users: Vec<ParticipantDto>,
    pub brush_color: String,
    pub brush_width: f64,
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new()
    }
}

/// What the session should do after a server message was applied.
#[derive(Debug)]
pub enum Reaction {
    Silent,
    Print(String),
    /// The replica is out of sync; request a fresh snapshot
    Resync(String),
    /// Stop the session with this error
    Fatal(ClientError),
}

impl ClientState {
    pub fn new() -> Self {
        Self {
            replica: CanvasReplica::new(),
            cursors: CursorTracker::new(),
            users: Vec::new(),
            brush_color: DEFAULT_BRUSH_COLOR.to_string(),
            brush_width: DEFAULT_BRUSH_WIDTH,
        }
    }

    /// Prepare for a fresh connection.
    pub fn reset_for_connect(&mut self) {
        self.replica.begin_resync();
        self.cursors.clear();
    }

    /// Apply one server message to the local view.
    pub fn apply(&mut self, message: ServerMessage, current_user_id: &str, now: i64) -> Reaction {
        match message {
            ServerMessage::InitState { operations } => {
                self.replica.apply_init_state(operations);
                Reaction::Print(MessageFormatter::format_init_state(
                    self.replica.len(),
                    self.replica.visible_operations().count(),
                ))
            }
            ServerMessage::RemoteOperation(operation) => {
                let line = MessageFormatter::format_remote_operation(&operation, current_user_id);
                match self.replica.apply_remote_operation(operation) {
                    Ok(ApplyOutcome::Applied) => Reaction::Print(line),
                    Ok(ApplyOutcome::Ignored) => Reaction::Silent,
                    Err(e) => Reaction::Resync(e.to_string()),
                }
            }
            ServerMessage::UndoRedo {
                operation_id,
                active,
            } => match self.replica.apply_undo_redo(&operation_id, active) {
                Ok(ApplyOutcome::Applied) => {
                    Reaction::Print(MessageFormatter::format_undo_redo(&operation_id, active))
                }
                Ok(ApplyOutcome::Ignored) => Reaction::Silent,
                Err(e) => Reaction::Resync(e.to_string()),
            },
            ServerMessage::Users { users } => {
                let output = MessageFormatter::format_users(&users, current_user_id);
                self.users = users;
                Reaction::Print(output)
            }
            ServerMessage::Pointer { user_id, x, y } => {
                self.cursors.update(user_id, PointDto { x, y }, now);
                Reaction::Silent
            }
            ServerMessage::Error { code, message } => {
                if code == ROOM_FULL_CODE {
                    Reaction::Fatal(ClientError::RoomFull(message))
                } else {
                    Reaction::Print(MessageFormatter::format_server_error(&code, &message))
                }
            }
        }
    }
}

/// Run one WebSocket session until the user quits or the connection drops
pub async fn run_client_session(
    config: &SessionConfig,
    state: &Arc<Mutex<ClientState>>,
    input: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = match connect_async(config.connect_url()).await {
        Ok(result) => result,
        Err(tungstenite::Error::Http(response)) if response.status().as_u16() == 400 => {
            return Err(ClientError::InvalidRoom(config.room.clone()));
        }
        Err(e) => return Err(ClientError::ConnectionError(e.to_string())),
    };

    tracing::info!("Connected to room '{}'", config.room);
    println!(
        "\nYou are '{}' in room '{}'. Type 'help' for commands. Press Ctrl+C to exit.\n",
        config.user_id, config.room
    );

    let (write, mut read) = ws_stream.split();
    let (out_tx, out_rx) = mpsc::unbounded_channel::<String>();
    let mut write_task = writer_loop(out_rx, write);

    state.lock().await.reset_for_connect();
    send(
        &out_tx,
        &ClientMessage::Join {
            user_id: Some(config.user_id.clone()),
            display_name: config.display_name.clone(),
            color: config.color.clone(),
        },
    );
    send(&out_tx, &ClientMessage::RequestState);

    // Spawn a task to handle incoming messages
    let read_state = state.clone();
    let read_tx = out_tx.clone();
    let user_id = config.user_id.clone();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let reaction = match serde_json::from_str::<ServerMessage>(text.as_str()) {
                        Ok(msg) => read_state.lock().await.apply(msg, &user_id, now_millis()),
                        Err(_) => Reaction::Print(MessageFormatter::format_raw_message(
                            text.as_str(),
                        )),
                    };
                    match reaction {
                        Reaction::Silent => {}
                        Reaction::Print(output) => {
                            print!("{}", output);
                            redisplay_prompt(&user_id);
                        }
                        Reaction::Resync(reason) => {
                            tracing::warn!("Replica out of sync: {}", reason);
                            print!("{}", MessageFormatter::format_resync(&reason));
                            redisplay_prompt(&user_id);
                            send(&read_tx, &ClientMessage::RequestState);
                        }
                        Reaction::Fatal(error) => return Err(error),
                    }
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
        Err(ClientError::ConnectionError("Connection lost".to_string()))
    });

    // If any one of the tasks completes, abort the others
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            read_result.unwrap_or_else(|e| Err(ClientError::ConnectionError(e.to_string())))
        }
        _ = &mut write_task => {
            read_task.abort();
            Err(ClientError::ConnectionError("Connection lost".to_string()))
        }
        _ = input_loop(config, state, &out_tx, input) => {
            read_task.abort();
            write_task.abort();
            Ok(())
        }
    }
}

/// Drain outgoing frames into the WebSocket sink.
fn writer_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut write: WsSink,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(json) = rx.recv().await {
            if let Err(e) = write.send(Message::Text(json.into())).await {
                tracing::warn!("Failed to send message: {}", e);
                break;
            }
        }
    })
}

/// Returns when the user quits or the input reader closes.
async fn input_loop(
    config: &SessionConfig,
    state: &Arc<Mutex<ClientState>>,
    out_tx: &mpsc::UnboundedSender<String>,
    input: &mut mpsc::UnboundedReceiver<String>,
) {
    while let Some(line) = input.recv().await {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        let mut state = state.lock().await;
        match command {
            Command::Draw { kind, path } => send(
                out_tx,
                &ClientMessage::Operation(OperationPayload {
                    id: None,
                    kind,
                    path,
                    color: state.brush_color.clone(),
                    width: state.brush_width,
                    author_id: Some(config.user_id.clone()),
                }),
            ),
            Command::Color(color) => {
                state.brush_color = color;
                print!(
                    "{}",
                    MessageFormatter::format_brush(&state.brush_color, state.brush_width)
                );
            }
            Command::Width(width) => {
                state.brush_width = width;
                print!(
                    "{}",
                    MessageFormatter::format_brush(&state.brush_color, state.brush_width)
                );
            }
            Command::Undo => send(out_tx, &ClientMessage::Undo),
            Command::Redo => send(out_tx, &ClientMessage::Redo),
            Command::Move(point) => send(out_tx, &ClientMessage::Pointer(point)),
            Command::Sync => {
                state.replica.begin_resync();
                send(out_tx, &ClientMessage::RequestState);
            }
            Command::Who => print!(
                "{}",
                MessageFormatter::format_users(&state.users, &config.user_id)
            ),
            Command::Show => {
                let cursors = state.cursors.visible(now_millis());
                print!(
                    "{}",
                    MessageFormatter::format_canvas(state.replica.operations(), &cursors)
                );
            }
            Command::Help => println!("{}", MessageFormatter::format_help()),
            Command::Quit => return,
        }
    }
}

fn send(out_tx: &mpsc::UnboundedSender<String>, message: &ClientMessage) {
    match serde_json::to_string(message) {
        Ok(json) => {
            if out_tx.send(json).is_err() {
                tracing::warn!("Connection is closing; message dropped");
            }
        }
        Err(e) => tracing::error!("Failed to serialize message: {}", e),
    }
}
