//! WebSocket message DTOs.
//!
//! Every frame is a JSON object discriminated by `"type"`; payload fields are camelCase.

use serde::{Deserialize, Serialize};

use crate::domain::OperationKind;

/// 2D point on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointDto {
    pub x: f64,
    pub y: f64,
}

fn default_color() -> String {
    "#000000".to_string()
}

fn default_width() -> f64 {
    4.0
}

/// Payload of a client `operation` message.
///
/// `path` and `authorId` are optional at the wire level so that their absence
/// is reported as a malformed intent rather than an opaque parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub kind: OperationKind,
    #[serde(default)]
    pub path: Vec<PointDto>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
}

/// Client → Server messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    Join {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    RequestState,
    Operation(OperationPayload),
    Pointer(PointDto),
    Undo,
    Redo,
}

/// An operation as stored in the authoritative log.
///
/// This is also the snapshot (checkpoint) format: every field is serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDto {
    pub id: String,
    pub kind: OperationKind,
    pub path: Vec<PointDto>,
    pub color: String,
    pub width: f64,
    pub author_id: String,
    pub created_at: i64,
    pub active: bool,
}

/// Roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub connection_id: String,
    pub user_id: String,
    pub display_name: String,
    pub color: String,
    pub joined_at: i64,
}

/// Server → Client messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    InitState {
        operations: Vec<OperationDto>,
    },
    RemoteOperation(OperationDto),
    #[serde(rename_all = "camelCase")]
    UndoRedo {
        operation_id: String,
        active: bool,
    },
    Users {
        users: Vec<ParticipantDto>,
    },
    #[serde(rename_all = "camelCase")]
    Pointer {
        user_id: String,
        x: f64,
        y: f64,
    },
    Error {
        code: String,
        message: String,
    },
}
