//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - Membership からの削除、MessagePusher からの登録解除、残りの参加者への参加者リスト配信
//!
//! ### なぜこのテストが必要か
//! - 切断した参加者がその後の配信対象に残らないことを保証する
//! - join していない接続の切断では何も配信しない
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の切断と通知
//! - エッジケース：最後の参加者の切断（通知対象なし）
//! - エッジケース：join 前の接続の切断

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, Participant, RoomEvent, RoomId, RoomRepository};

use super::sequencer::RoomSequencer;

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: Arc<RoomSequencer>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
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

    /// 参加者切断を実行
    ///
    /// 何度呼んでも安全です。
    ///
    /// # Returns
    ///
    /// * `Some(Participant)` - 削除された参加者
    /// * `None` - 接続は Room に参加していなかった
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Option<Participant> {
        // 1. 以降の配信対象から外すため、先に送信キューを登録解除
        self.message_pusher.unregister_client(connection_id).await;

        let _guard = self.sequencer.acquire(room_id).await;

        // 2. Membership から削除
        let removed = self.repository.leave(room_id, connection_id).await?;

        // 3. 残りの参加者に更新後の参加者リストを配信
        let roster = self.repository.list_participants(room_id).await;
        if !roster.is_empty() {
            let targets = roster.iter().map(|p| p.connection_id).collect();
            if let Err(e) = self
                .message_pusher
                .broadcast(targets, &RoomEvent::Users(roster))
                .await
            {
                tracing::warn!("Failed to broadcast users for room '{}': {}", room_id, e);
            }
        }

        tracing::info!(
            "'{}' left room '{}' (connection '{}')",
            removed.user_id,
            room_id,
            connection_id
        );
        Some(removed)
    }
}
