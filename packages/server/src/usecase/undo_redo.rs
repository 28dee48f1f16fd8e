//! UseCase: undo / redo
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - UndoRedoUseCase::undo() / redo() メソッド
//! - 状態が変化したときだけ `undo-redo` 差分がブロードキャストされること
//!
//! ### なぜこのテストが必要か
//! - undo / redo は Room 全体に作用する（誰の操作かを問わない）
//! - 何も変化しない undo / redo で不要な差分を配信しない
//!
//! ### どのような状況を想定しているか
//! - 正常系：undo → redo の往復
//! - エッジケース：空のログへの undo、undo 済みでない状態での redo

use std::sync::Arc;

use crate::domain::{MessagePusher, Operation, RoomEvent, RoomId, RoomRepository};

use super::{error::IntentError, sequencer::RoomSequencer};

pub struct UndoRedoUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: Arc<RoomSequencer>,
}

impl UndoRedoUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sequencer: Arc<RoomSequencer>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            sequencer,
        }
    }

    /// 直近の active な操作を無効化する。対象が無ければ `Ok(None)`
    pub async fn undo(&self, room_id: &RoomId) -> Result<Option<Operation>, IntentError> {
        let _guard = self.sequencer.acquire(room_id).await;
        let changed = self.repository.undo(room_id).await?;
        self.announce(room_id, changed.as_ref(), "undo").await;
        Ok(changed)
    }

    /// カーソル以降で最初の inactive な操作を再有効化する。対象が無ければ `Ok(None)`
    pub async fn redo(&self, room_id: &RoomId) -> Result<Option<Operation>, IntentError> {
        let _guard = self.sequencer.acquire(room_id).await;
        let changed = self.repository.redo(room_id).await?;
        self.announce(room_id, changed.as_ref(), "redo").await;
        Ok(changed)
    }

    /// Caller must hold the room guard.
    async fn announce(&self, room_id: &RoomId, changed: Option<&Operation>, action: &str) {
        let Some(operation) = changed else {
            tracing::debug!("Nothing to {} in room '{}'", action, room_id);
            return;
        };

        let targets = self
            .repository
            .list_participants(room_id)
            .await
            .into_iter()
            .map(|p| p.connection_id)
            .collect();
        if let Err(e) = self
            .message_pusher
            .broadcast(targets, &RoomEvent::undo_redo(operation))
            .await
        {
            tracing::warn!(
                "Failed to broadcast {} of '{}' in room '{}': {}",
                action,
                operation.id(),
                room_id,
                e
            );
        }
        tracing::debug!(
            "{} '{}' in room '{}' (active: {})",
            action,
            operation.id(),
            room_id,
            operation.is_active()
        );
    }
}
