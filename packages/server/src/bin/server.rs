//! Rakugaki shared-canvas server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin rakugaki-server
//! cargo run --bin rakugaki-server -- --host 0.0.0.0 --port 3000 --room studio
//! ```

use std::sync::Arc;

use clap::Parser;
use rakugaki_server::{
    domain::{DEFAULT_PARTICIPANT_CAPACITY, RandomColorPicker, RoomId, UuidOperationIdGenerator},
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
    ui::Server,
    usecase::{GetRoomDetailUseCase, GetRoomSnapshotUseCase, GetRoomsUseCase, SyncCoordinator},
};
use rakugaki_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "rakugaki-server")]
#[command(about = "Shared-canvas synchronization server for collaborative drawing", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Room joined by clients that do not pass `?room=`
    #[arg(long, default_value = "main")]
    room: String,

    /// Maximum number of participants per room
    #[arg(long, default_value_t = DEFAULT_PARTICIPANT_CAPACITY)]
    max_participants: usize,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let default_room = match RoomId::new(args.room.clone()) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Invalid --room '{}': {}", args.room, e);
            std::process::exit(1);
        }
    };

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Create Repository (in-memory, rooms are created on first join)
    let clock = Arc::new(SystemClock);
    let repository = Arc::new(
        InMemoryRoomRepository::new(Arc::new(UuidOperationIdGenerator), clock.clone())
            .with_participant_capacity(args.max_participants),
    );

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::default());

    // 3. Create UseCases
    let coordinator = Arc::new(SyncCoordinator::new(
        repository.clone(),
        message_pusher,
        Arc::new(RandomColorPicker),
        clock,
    ));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(repository.clone()));
    let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(repository.clone()));
    let get_room_snapshot_usecase = Arc::new(GetRoomSnapshotUseCase::new(repository));

    // 4. Create and run the server
    let server = Server::new(
        coordinator,
        get_rooms_usecase,
        get_room_detail_usecase,
        get_room_snapshot_usecase,
        default_room,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
