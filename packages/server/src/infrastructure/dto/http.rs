//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Room summary for `GET /api/rooms`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub id: String,
    /// User ids of the connected participants
    pub participants: Vec<String>,
    pub operation_count: usize,
    /// RFC 3339
    pub created_at: String,
}

/// Participant detail for `GET /api/rooms/{room_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDetailDto {
    pub connection_id: String,
    pub user_id: String,
    pub display_name: String,
    pub color: String,
    /// RFC 3339
    pub joined_at: String,
}

/// Room detail for `GET /api/rooms/{room_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub id: String,
    pub participants: Vec<ParticipantDetailDto>,
    pub operation_count: usize,
    pub active_operation_count: usize,
    pub cursor: usize,
    /// RFC 3339
    pub created_at: String,
}
