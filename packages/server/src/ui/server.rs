//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{
    domain::RoomId,
    usecase::{GetRoomDetailUseCase, GetRoomSnapshotUseCase, GetRoomsUseCase, SyncCoordinator},
};

use super::{
    handler::{
        get_room_detail, get_room_operations, get_rooms, health_check, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Shared-canvas synchronization server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     coordinator,
///     get_rooms_usecase,
///     get_room_detail_usecase,
///     get_room_snapshot_usecase,
///     default_room,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    coordinator: Arc<SyncCoordinator>,
    get_rooms_usecase: Arc<GetRoomsUseCase>,
    get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    get_room_snapshot_usecase: Arc<GetRoomSnapshotUseCase>,
    default_room: RoomId,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `coordinator` - Drives every WebSocket connection
    /// * `get_rooms_usecase` - UseCase for getting rooms list
    /// * `get_room_detail_usecase` - UseCase for getting room detail
    /// * `get_room_snapshot_usecase` - UseCase for reading a room's operation log
    /// * `default_room` - Room joined when the client omits `?room=`
    pub fn new(
        coordinator: Arc<SyncCoordinator>,
        get_rooms_usecase: Arc<GetRoomsUseCase>,
        get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
        get_room_snapshot_usecase: Arc<GetRoomSnapshotUseCase>,
        default_room: RoomId,
    ) -> Self {
        Self {
            coordinator,
            get_rooms_usecase,
            get_room_detail_usecase,
            get_room_snapshot_usecase,
            default_room,
        }
    }

    /// Build the router without binding a listener.
    pub fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            coordinator: self.coordinator,
            get_rooms_usecase: self.get_rooms_usecase,
            get_room_detail_usecase: self.get_room_detail_usecase,
            get_room_snapshot_usecase: self.get_room_snapshot_usecase,
            default_room: self.default_room,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .route("/api/rooms/{room_id}/operations", get(get_room_operations))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the server until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let default_room = self.default_room.clone();
        let app = self.router();

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "Rakugaki server listening on {}",
            listener.local_addr()?
        );
        tracing::info!(
            "Connect to: ws://{}/ws?room={}",
            bind_addr,
            default_room
        );
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
