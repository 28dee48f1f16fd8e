//! UseCase: ポインタ位置の共有
//!
//! ポインタ移動は一時的な情報であり、ログには記録しません。
//! 順序保証も不要なため `RoomSequencer` を経由しません。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, Point, RoomEvent, RoomId, RoomRepository, UserId};

pub struct PointerMoveUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl PointerMoveUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 送信者以外の参加者にポインタ位置を配信し、配信先を返す
    pub async fn execute(
        &self,
        room_id: &RoomId,
        sender: &ConnectionId,
        user_id: UserId,
        point: Point,
    ) -> Vec<ConnectionId> {
        let targets: Vec<ConnectionId> = self
            .repository
            .list_participants(room_id)
            .await
            .into_iter()
            .map(|p| p.connection_id)
            .filter(|id| id != sender)
            .collect();
        if targets.is_empty() {
            return targets;
        }

        if let Err(e) = self
            .message_pusher
            .broadcast(targets.clone(), &RoomEvent::Pointer { user_id, point })
            .await
        {
            tracing::trace!("Failed to relay pointer in room '{}': {}", room_id, e);
        }
        targets
    }
}
