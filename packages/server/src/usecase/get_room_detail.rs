//! UseCase: Room 詳細の取得

use std::sync::Arc;

use crate::domain::{Room, RoomId, RoomRepository};

use super::error::GetRoomDetailError;

pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, room_id: &RoomId) -> Result<Room, GetRoomDetailError> {
        self.repository
            .get_room(room_id)
            .await
            .map_err(|_| GetRoomDetailError::RoomNotFound)
    }
}
