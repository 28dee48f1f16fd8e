//! Error types for the Rakugaki terminal client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server refused the room id (HTTP 400 on upgrade)
    #[error("Room '{0}' was rejected by the server")]
    InvalidRoom(String),

    /// The room reached its participant capacity
    #[error("Room is full: {0}")]
    RoomFull(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// The local replica can no longer be reconciled with a delta and needs a fresh snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesyncError {
    #[error("operation '{0}' is already in the local log")]
    DuplicateOperation(String),

    #[error("operation '{0}' is not in the local log")]
    UnknownOperation(String),
}

/// Errors while parsing a line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("invalid point '{0}' (expected x,y)")]
    InvalidPoint(String),

    #[error("invalid width '{0}' (expected a non-negative number)")]
    InvalidWidth(String),
}
