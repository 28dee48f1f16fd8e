//! UseCase: Room の操作ログ取得（HTTP 向けの読み取り専用ビュー）

use std::sync::Arc;

use crate::domain::{Operation, RoomId, RoomRepository};

use super::error::GetRoomDetailError;

pub struct GetRoomSnapshotUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomSnapshotUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// ログをカーソル位置に関係なく全件返す（inactive な操作を含む）
    pub async fn execute(&self, room_id: &RoomId) -> Result<Vec<Operation>, GetRoomDetailError> {
        self.repository
            .snapshot(room_id)
            .await
            .map_err(|_| GetRoomDetailError::RoomNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            Color, NewOperation, OperationKind, Point, SequentialOperationIdGenerator, Timestamp,
            UserId,
        },
        infrastructure::repository::InMemoryRoomRepository,
    };
    use rakugaki_shared::time::FixedClock;

    #[tokio::test]
    async fn test_snapshot_includes_inactive_operations() {
        // テスト項目: undo 済みの操作もスナップショットに含まれる
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new(
            Arc::new(SequentialOperationIdGenerator::new("op")),
            Arc::new(FixedClock::new(0)),
        ));
        let room_id = RoomId::new("main".to_string()).unwrap();
        repository.join_as(&room_id, "bob").await;
        for _ in 0..2 {
            let draft = NewOperation::new(
                OperationKind::Erase,
                vec![Point::new(5.0, 5.0)],
                Color::new("#ffffff"),
                8.0,
                UserId::new("bob".to_string()).unwrap(),
            )
            .unwrap();
            repository
                .append_operation(&room_id, draft, Timestamp::new(0))
                .await
                .unwrap();
        }
        repository.undo(&room_id).await.unwrap();
        let usecase = GetRoomSnapshotUseCase::new(repository);

        // when (操作):
        let operations = usecase.execute(&room_id).await.unwrap();

        // then (期待する結果):
        assert_eq!(operations.len(), 2);
        assert!(operations[0].is_active());
        assert!(!operations[1].is_active());
    }

    #[tokio::test]
    async fn test_snapshot_of_unknown_room_is_not_found() {
        // テスト項目: 存在しない Room は RoomNotFound になる
        // given (前提条件):
        let usecase = GetRoomSnapshotUseCase::new(Arc::new(InMemoryRoomRepository::new(
            Arc::new(SequentialOperationIdGenerator::new("op")),
            Arc::new(FixedClock::new(0)),
        )));

        // when (操作):
        let result = usecase
            .execute(&RoomId::new("missing".to_string()).unwrap())
            .await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), GetRoomDetailError::RoomNotFound);
    }
}
