//! UseCase: ログ全体のスナップショット要求
//!
//! 要求した接続にのみ `init-state` を返します。他の参加者には何も送りません。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomEvent, RoomId, RoomRepository};

use super::{error::IntentError, sequencer::RoomSequencer};

pub struct RequestStateUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: Arc<RoomSequencer>,
}

impl RequestStateUseCase {
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

    /// スナップショットを要求者に送信し、送った操作の件数を返す
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<usize, IntentError> {
        // スナップショットの取得と送信キューへの投入の間に他の操作が割り込まないようにする
        let _guard = self.sequencer.acquire(room_id).await;

        let operations = self.repository.snapshot(room_id).await?;
        let count = operations.len();
        if let Err(e) = self
            .message_pusher
            .push_to(connection_id, &RoomEvent::InitState { operations })
            .await
        {
            tracing::warn!(
                "Failed to push init-state to connection '{}': {}",
                connection_id,
                e
            );
        }

        tracing::debug!(
            "Sent snapshot of room '{}' ({} operations) to connection '{}'",
            room_id,
            count,
            connection_id
        );
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Color, MockMessagePusher, NewOperation, OperationKind, Point, SequentialOperationIdGenerator,
        Timestamp, UserId,
    };
    use crate::infrastructure::repository::InMemoryRoomRepository;
    use rakugaki_shared::time::FixedClock;

    fn room_id() -> RoomId {
        RoomId::new("main".to_string()).unwrap()
    }

    fn create_repository() -> Arc<InMemoryRoomRepository> {
        Arc::new(InMemoryRoomRepository::new(
            Arc::new(SequentialOperationIdGenerator::new("op")),
            Arc::new(FixedClock::new(0)),
        ))
    }

    fn stroke() -> NewOperation {
        NewOperation::new(
            OperationKind::Stroke,
            vec![Point::new(0.0, 0.0)],
            Color::new("#000000"),
            2.0,
            UserId::new("alice".to_string()).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_request_state_pushes_only_to_requester() {
        // テスト項目: スナップショットは要求者にのみ送信される
        // given (前提条件):
        let repository = create_repository();
        repository.join_as(&room_id(), "alice").await;
        for _ in 0..2 {
            repository
                .append_operation(&room_id(), stroke(), Timestamp::new(1))
                .await
                .unwrap();
        }
        let requester = ConnectionId::generate();

        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .withf(move |target, event| {
                *target == requester
                    && matches!(event, RoomEvent::InitState { operations } if operations.len() == 2)
            })
            .times(1)
            .returning(|_, _| Ok(()));
        pusher.expect_broadcast().times(0);

        let usecase =
            RequestStateUseCase::new(repository, Arc::new(pusher), Arc::new(RoomSequencer::new()));

        // when (操作):
        let count = usecase.execute(&room_id(), &requester).await.unwrap();

        // then (期待する結果):
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_request_state_of_unknown_room_is_internal_error() {
        // テスト項目: 存在しない Room のスナップショット要求は内部エラーとなり、何も送信されない
        // given (前提条件):
        let mut pusher = MockMessagePusher::new();
        pusher.expect_push_to().times(0);
        let usecase = RequestStateUseCase::new(
            create_repository(),
            Arc::new(pusher),
            Arc::new(RoomSequencer::new()),
        );

        // when (操作):
        let result = usecase.execute(&room_id(), &ConnectionId::generate()).await;

        // then (期待する結果):
        assert!(matches!(result, Err(IntentError::Repository(_))));
    }
}
