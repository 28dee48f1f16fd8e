//! Rakugaki terminal client with reconnection support.
//!
//! Joins a room, keeps a local copy of the shared canvas, and sends strokes,
//! erases, undo/redo and pointer moves typed at the prompt.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin rakugaki-client -- --user-id alice --name Alice
//! cargo run --bin rakugaki-client -- -r studio
//! ```

use clap::Parser;

use rakugaki_client::{SessionConfig, domain::generate_user_id, run_client};
use rakugaki_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "rakugaki-client")]
#[command(about = "Terminal client for the Rakugaki shared canvas", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Room to join
    #[arg(short = 'r', long, default_value = "main")]
    room: String,

    /// User id (random `u-xxxxxx` when omitted)
    #[arg(short = 'U', long)]
    user_id: Option<String>,

    /// Display name (the server uses `User-<last 4 of user id>` when omitted)
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Cursor / brush color announced on join (the server picks one when omitted)
    #[arg(long)]
    color: Option<String>,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = SessionConfig {
        url: args.url,
        room: args.room,
        user_id: args.user_id.unwrap_or_else(generate_user_id),
        display_name: args.name,
        color: args.color,
    };

    // Run the client
    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
