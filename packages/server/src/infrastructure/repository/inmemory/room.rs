//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用し、プロセスの生存期間だけ状態を保持します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use rakugaki_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, DEFAULT_PARTICIPANT_CAPACITY, NewOperation, Operation, OperationIdGenerator,
    Participant, RepositoryError, Room, RoomId, RoomRepository, Timestamp,
};

/// インメモリ Room Repository 実装
///
/// Room ごとに `OperationLog` と `Membership` を保持します（依存性の逆転）。
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<RoomId, Room>>,
    /// 採番されていない操作に ID を割り当てる
    id_generator: Arc<dyn OperationIdGenerator>,
    /// Room 作成時刻の取得に使う
    clock: Arc<dyn Clock>,
    participant_capacity: usize,
}

impl InMemoryRoomRepository {
    pub fn new(id_generator: Arc<dyn OperationIdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            id_generator,
            clock,
            participant_capacity: DEFAULT_PARTICIPANT_CAPACITY,
        }
    }

    /// Set the capacity used for rooms created from now on.
    pub fn with_participant_capacity(mut self, participant_capacity: usize) -> Self {
        self.participant_capacity = participant_capacity;
        self
    }

    fn new_room(&self, room_id: &RoomId) -> Room {
        tracing::info!("Room '{}' created", room_id);
        Room::with_capacity(
            room_id.clone(),
            Timestamp::new(self.clock.now_millis()),
            self.participant_capacity,
        )
    }
}

#[cfg(test)]
impl InMemoryRoomRepository {
    /// Joins a fresh connection as `user_id`, creating the room if needed.
    pub(crate) async fn join_as(&self, room_id: &RoomId, user_id: &str) -> Participant {
        use crate::domain::{Color, DisplayName, UserId};

        let participant = Participant::new(
            ConnectionId::generate(),
            UserId::new(user_id.to_string()).unwrap(),
            DisplayName::new(user_id.to_string()).unwrap(),
            Color::new("#000"),
            Timestamp::new(self.clock.now_millis()),
        );
        self.join(room_id, participant.clone()).await.unwrap();
        participant
    }
}

fn room_not_found(room_id: &RoomId) -> RepositoryError {
    RepositoryError::RoomNotFound(room_id.as_str().to_string())
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn get_room(&self, room_id: &RoomId) -> Result<Room, RepositoryError> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| room_not_found(room_id))
    }

    async fn list_rooms(&self) -> Vec<Room> {
        let rooms = self.rooms.lock().await;
        let mut list: Vec<Room> = rooms.values().cloned().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        list
    }

    async fn join(
        &self,
        room_id: &RoomId,
        participant: Participant,
    ) -> Result<Vec<Participant>, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        if !rooms.contains_key(room_id) {
            let room = self.new_room(room_id);
            rooms.insert(room_id.clone(), room);
        }
        let room = rooms.get_mut(room_id).ok_or_else(|| room_not_found(room_id))?;
        room.join(participant)?;
        Ok(room.membership().list())
    }

    async fn leave(&self, room_id: &RoomId, connection_id: &ConnectionId) -> Option<Participant> {
        let mut rooms = self.rooms.lock().await;
        rooms.get_mut(room_id)?.leave(connection_id)
    }

    async fn list_participants(&self, room_id: &RoomId) -> Vec<Participant> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .map(|room| room.membership().list())
            .unwrap_or_default()
    }

    async fn append_operation(
        &self,
        room_id: &RoomId,
        draft: NewOperation,
        created_at: Timestamp,
    ) -> Result<Operation, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id).ok_or_else(|| room_not_found(room_id))?;
        Ok(room.append(draft, self.id_generator.as_ref(), created_at))
    }

    async fn undo(&self, room_id: &RoomId) -> Result<Option<Operation>, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id).ok_or_else(|| room_not_found(room_id))?;
        Ok(room.undo())
    }

    async fn redo(&self, room_id: &RoomId) -> Result<Option<Operation>, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id).ok_or_else(|| room_not_found(room_id))?;
        Ok(room.redo())
    }

    async fn snapshot(&self, room_id: &RoomId) -> Result<Vec<Operation>, RepositoryError> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .map(|room| room.log().snapshot())
            .ok_or_else(|| room_not_found(room_id))
    }
}
