//! Rakugaki shared-canvas synchronization server.
//!
//! Each room owns one append-only operation log with an undo/redo cursor and
//! one participant set. Clients talk to the server over WebSocket; every
//! durable change is applied to the log before it is broadcast.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
