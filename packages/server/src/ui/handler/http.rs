//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::RoomId,
    infrastructure::dto::{
        http::{ParticipantDetailDto, RoomDetailDto, RoomSummaryDto},
        websocket::OperationDto,
    },
    ui::state::AppState,
    usecase::GetRoomDetailError,
};
use rakugaki_shared::time::timestamp_to_rfc3339;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    let room_summaries: Vec<RoomSummaryDto> = rooms
        .into_iter()
        .map(|room| RoomSummaryDto {
            id: room.id.as_str().to_string(),
            participants: room
                .membership()
                .list()
                .into_iter()
                .map(|p| p.user_id.into_string())
                .collect(),
            operation_count: room.log().len(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        })
        .collect();

    Json(room_summaries)
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room_id = RoomId::try_from(room_id).map_err(|_| StatusCode::NOT_FOUND)?;

    match state.get_room_detail_usecase.execute(&room_id).await {
        Ok(room) => {
            // Domain Model から DTO への変換
            let room_detail = RoomDetailDto {
                id: room.id.as_str().to_string(),
                participants: room
                    .membership()
                    .list()
                    .into_iter()
                    .map(|p| ParticipantDetailDto {
                        connection_id: p.connection_id.to_string(),
                        user_id: p.user_id.into_string(),
                        display_name: p.display_name.into_string(),
                        color: p.color.as_str().to_string(),
                        joined_at: timestamp_to_rfc3339(p.joined_at.value()),
                    })
                    .collect(),
                operation_count: room.log().len(),
                active_operation_count: room.log().active_count(),
                cursor: room.log().cursor(),
                created_at: timestamp_to_rfc3339(room.created_at.value()),
            };
            Ok(Json(room_detail))
        }
        Err(GetRoomDetailError::RoomNotFound) => Err(StatusCode::NOT_FOUND),
    }
}

/// Get the full operation log of a room (inactive operations included)
pub async fn get_room_operations(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<OperationDto>>, StatusCode> {
    let room_id = RoomId::try_from(room_id).map_err(|_| StatusCode::NOT_FOUND)?;

    match state.get_room_snapshot_usecase.execute(&room_id).await {
        Ok(operations) => Ok(Json(operations.iter().map(OperationDto::from).collect())),
        Err(GetRoomDetailError::RoomNotFound) => Err(StatusCode::NOT_FOUND),
    }
}
