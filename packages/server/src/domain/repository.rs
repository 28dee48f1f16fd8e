//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! Room 単位の直列化は UseCase 層の `RoomSequencer` が保証します。
//! Repository の各メソッドはそれぞれ単体でアトミックです。

use async_trait::async_trait;

use super::{
    ConnectionId, NewOperation, Operation, Participant, RepositoryError, Room, RoomId, Timestamp,
};

#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Room エンティティを取得
    async fn get_room(&self, room_id: &RoomId) -> Result<Room, RepositoryError>;

    /// 全ての Room を取得（ID 順）
    async fn list_rooms(&self) -> Vec<Room>;

    /// 参加者を追加または更新（Room が存在しなければ作成）し、更新後の参加者リストを返す
    async fn join(
        &self,
        room_id: &RoomId,
        participant: Participant,
    ) -> Result<Vec<Participant>, RepositoryError>;

    /// 参加者を削除（存在しなければ何もしない）
    async fn leave(&self, room_id: &RoomId, connection_id: &ConnectionId) -> Option<Participant>;

    /// Room の参加者リストを取得（Room が存在しなければ空）
    async fn list_participants(&self, room_id: &RoomId) -> Vec<Participant>;

    /// 操作をログに追記
    async fn append_operation(
        &self,
        room_id: &RoomId,
        draft: NewOperation,
        created_at: Timestamp,
    ) -> Result<Operation, RepositoryError>;

    /// 直近の active な操作を undo
    async fn undo(&self, room_id: &RoomId) -> Result<Option<Operation>, RepositoryError>;

    /// カーソル以降の最初の inactive な操作を redo
    async fn redo(&self, room_id: &RoomId) -> Result<Option<Operation>, RepositoryError>;

    /// ログのスナップショットを取得
    async fn snapshot(&self, room_id: &RoomId) -> Result<Vec<Operation>, RepositoryError>;
}
