//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{RejectReason, RepositoryError, RoomError};

/// クライアントの意図（intent）を処理できなかった理由
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    /// 不正な形式のメッセージ（必須フィールドの欠落など）
    #[error("malformed intent: {0}")]
    Malformed(String),

    /// join 前に join 以外の intent を送った
    #[error("connection has not joined a room")]
    NotJoined,

    /// Room の定員超過
    #[error("room is full (capacity: {capacity})")]
    RoomFull { capacity: usize },

    /// 権威側の内部エラー（ログのみ、クライアントには通知しない）
    #[error("repository error: {0}")]
    Repository(RepositoryError),

    /// intent を実行するタスクが異常終了した（ログのみ）
    #[error("intent task failed: {0}")]
    TaskFailed(String),
}

impl IntentError {
    /// 送信者に通知すべき場合はその理由を返す
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Self::Malformed(_) => Some(RejectReason::MalformedIntent),
            Self::NotJoined => Some(RejectReason::NotJoined),
            Self::RoomFull { .. } => Some(RejectReason::RoomFull),
            Self::Repository(_) | Self::TaskFailed(_) => None,
        }
    }
}

impl From<RepositoryError> for IntentError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Room(RoomError::Full { capacity }) => Self::RoomFull { capacity },
            other => Self::Repository(other),
        }
    }
}

/// Room 参照系ユースケースのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("room not found")]
    RoomNotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_full_repository_error_maps_to_room_full() {
        // テスト項目: Repository の定員超過エラーは RoomFull に変換される
        // given (前提条件):
        let error = RepositoryError::Room(RoomError::Full { capacity: 3 });

        // when (操作):
        let result = IntentError::from(error);

        // then (期待する結果):
        assert_eq!(result, IntentError::RoomFull { capacity: 3 });
        assert_eq!(result.reject_reason(), Some(RejectReason::RoomFull));
    }

    #[test]
    fn test_repository_errors_are_not_reported_to_sender() {
        // テスト項目: 内部エラーは送信者に通知されない
        // given (前提条件):
        let error = IntentError::from(RepositoryError::RoomNotFound("main".to_string()));

        // when (操作):
        let reason = error.reject_reason();

        // then (期待する結果):
        assert_eq!(reason, None);
    }
}
