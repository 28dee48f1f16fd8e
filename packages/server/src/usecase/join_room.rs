//! UseCase: Room への参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 色の自動割り当て、表示名の既定値、参加者リストのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - join は参加者リスト（users）を Room 全員に配る唯一の契機
//! - 参加者自身もブロードキャスト対象に含まれることを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：色・表示名を省略した join
//! - 正常系：同じ接続による再 join（upsert）
//! - 異常系：Room の定員超過

use std::sync::Arc;

use rakugaki_shared::time::Clock;

use crate::domain::{
    Color, ColorPicker, ConnectionId, DisplayName, MessagePusher, Participant, RoomEvent, RoomId,
    RoomRepository, Timestamp, UserId,
};

use super::{error::IntentError, sequencer::RoomSequencer};

/// Room 参加のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: Arc<RoomSequencer>,
    /// 色が指定されなかった参加者に色を割り当てる
    color_picker: Arc<dyn ColorPicker>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sequencer: Arc<RoomSequencer>,
        color_picker: Arc<dyn ColorPicker>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            sequencer,
            color_picker,
            clock,
        }
    }

    /// Room への参加を実行し、参加者リストを Room 全員（参加者自身を含む）にブロードキャストする
    ///
    /// # Returns
    ///
    /// * `Ok(Participant)` - 登録された参加者
    /// * `Err(IntentError::RoomFull)` - 定員超過
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: ConnectionId,
        user_id: UserId,
        display_name: Option<DisplayName>,
        color: Option<Color>,
    ) -> Result<Participant, IntentError> {
        let display_name = match display_name {
            Some(name) => name,
            None => default_display_name(&user_id)?,
        };
        let color = color.unwrap_or_else(|| self.color_picker.pick());
        let participant = Participant::new(
            connection_id,
            user_id,
            display_name,
            color,
            Timestamp::new(self.clock.now_millis()),
        );

        let _guard = self.sequencer.acquire(room_id).await;

        // 1. Membership に登録（Room が無ければ作成）
        let roster = self.repository.join(room_id, participant.clone()).await?;

        // 2. 参加者自身を含む全員に参加者リストを配信
        let targets = roster.iter().map(|p| p.connection_id).collect();
        if let Err(e) = self
            .message_pusher
            .broadcast(targets, &RoomEvent::Users(roster))
            .await
        {
            tracing::warn!("Failed to broadcast users for room '{}': {}", room_id, e);
        }

        tracing::info!(
            "'{}' joined room '{}' as connection '{}'",
            participant.user_id,
            room_id,
            connection_id
        );
        Ok(participant)
    }
}

/// `User-<last four characters of the user id>`
fn default_display_name(user_id: &UserId) -> Result<DisplayName, IntentError> {
    let chars: Vec<char> = user_id.as_str().chars().collect();
    let suffix: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    DisplayName::new(format!("User-{}", suffix)).map_err(|e| IntentError::Malformed(e.to_string()))
}
