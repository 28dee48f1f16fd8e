//! UseCase: 描画操作の送信
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SubmitOperationUseCase::execute() メソッド
//! - 権威側での ID 確定・タイムスタンプ付与と、送信者を含む全員へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 送信者も自分の操作を `remote-operation` で受け取ることで、全員が同じ順序でログを再生できる
//!
//! ### どのような状況を想定しているか
//! - 正常系：操作の追記とブロードキャスト
//! - エッジケース：クライアント提案 ID の衝突

use std::sync::Arc;

use rakugaki_shared::time::Clock;

use crate::domain::{MessagePusher, NewOperation, Operation, RoomEvent, RoomId, RoomRepository, Timestamp};

use super::{error::IntentError, sequencer::RoomSequencer};

pub struct SubmitOperationUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: Arc<RoomSequencer>,
    clock: Arc<dyn Clock>,
}

impl SubmitOperationUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sequencer: Arc<RoomSequencer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            sequencer,
            clock,
        }
    }

    /// 操作をログに追記し、確定した操作を Room 全員（送信者を含む）にブロードキャストする
    pub async fn execute(
        &self,
        room_id: &RoomId,
        draft: NewOperation,
    ) -> Result<Operation, IntentError> {
        let _guard = self.sequencer.acquire(room_id).await;

        let created_at = Timestamp::new(self.clock.now_millis());
        let operation = self
            .repository
            .append_operation(room_id, draft, created_at)
            .await?;

        let targets = self
            .repository
            .list_participants(room_id)
            .await
            .into_iter()
            .map(|p| p.connection_id)
            .collect();
        if let Err(e) = self
            .message_pusher
            .broadcast(targets, &RoomEvent::RemoteOperation(operation.clone()))
            .await
        {
            tracing::warn!(
                "Failed to broadcast operation '{}' in room '{}': {}",
                operation.id(),
                room_id,
                e
            );
        }

        tracing::debug!(
            "Operation '{}' appended to room '{}' by '{}'",
            operation.id(),
            room_id,
            operation.author_id()
        );
        Ok(operation)
    }
}
