//! UI layer: the axum router and its WebSocket / HTTP handlers.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
