//! Terminal client for Rakugaki.
//!
//! Keeps a local replica of the room's operation log, prints remote changes as
//! they arrive, and sends drawing commands typed at the prompt.

pub mod command;
pub mod cursor;
pub mod domain;
pub mod error;
pub mod replica;

mod formatter;
mod runner;
mod session;
mod ui;

pub use runner::run_client;
pub use session::SessionConfig;
