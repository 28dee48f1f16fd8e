//! SyncCoordinator: 接続ごとのプロトコル状態機械
//!
//! 接続の状態は `Unjoined → Joined → Disconnected` と遷移します。
//! join 以外の intent は Joined の接続からのみ受け付け、Disconnected 以降の intent は無視します。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - connect / handle / reject / disconnect を通した接続のライフサイクル
//! - 実際の `WebSocketMessagePusher` を使い、各接続の送信キューに届くメッセージを検証
//!
//! ### なぜこのテストが必要か
//! - 個々のユースケースを組み合わせたときの配信先と配信順序を保証する
//! - 同時に届いた操作が、全員に同じ順序で配信されることを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：join → operation → undo → disconnect
//! - 異常系：join 前の intent、不正な形式の intent、定員超過
//! - 並行性：複数の送信者からの同時送信、Room 間の分離
//! - 途中破棄：配信待ちの handle が破棄されても、適用済みの変更は配信される

use std::sync::Arc;

use rakugaki_shared::time::Clock;
use tokio::task::JoinHandle;

use crate::domain::{
    ColorPicker, ConnectionId, MessagePusher, PusherChannel, RoomEvent, RoomId, RoomRepository,
    UserId,
};

use super::{
    disconnect_participant::DisconnectParticipantUseCase, error::IntentError,
    intent::ClientIntent, join_room::JoinRoomUseCase, pointer_move::PointerMoveUseCase,
    request_state::RequestStateUseCase, sequencer::RoomSequencer,
    submit_operation::SubmitOperationUseCase, undo_redo::UndoRedoUseCase,
};

/// 処理中の intent。join が完了した場合は参加したユーザー ID を返す
type InFlightIntent = JoinHandle<Result<Option<UserId>, IntentError>>;

/// 接続の状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Unjoined,
    Joined { user_id: UserId },
    Disconnected,
}

/// 1 つの接続に対応するセッション（UI 層が接続ごとに 1 つ保持する）
#[derive(Debug)]
pub struct ConnectionSession {
    connection_id: ConnectionId,
    room_id: RoomId,
    state: ConnectionState,
    /// `handle` の future が破棄されても走り続けている intent
    in_flight: Option<InFlightIntent>,
}

impl ConnectionSession {
    pub fn new(connection_id: ConnectionId, room_id: RoomId) -> Self {
        Self {
            connection_id,
            room_id,
            state: ConnectionState::Unjoined,
            in_flight: None,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Joined のときだけユーザー ID を返す
    pub fn user_id(&self) -> Option<&UserId> {
        match &self.state {
            ConnectionState::Joined { user_id } => Some(user_id),
            _ => None,
        }
    }
}

/// Room の状態を変更する intent のユースケース群
///
/// intent ごとに別タスクで実行するため `Arc` で共有する。
struct IntentHandlers {
    join_room: JoinRoomUseCase,
    request_state: RequestStateUseCase,
    submit_operation: SubmitOperationUseCase,
    undo_redo: UndoRedoUseCase,
    pointer_move: PointerMoveUseCase,
}

impl IntentHandlers {
    async fn dispatch(
        &self,
        room_id: &RoomId,
        connection_id: ConnectionId,
        joined_user: Option<UserId>,
        intent: ClientIntent,
    ) -> Result<Option<UserId>, IntentError> {
        match (intent, joined_user) {
            (
                ClientIntent::Join {
                    user_id,
                    display_name,
                    color,
                },
                _,
            ) => {
                let participant = self
                    .join_room
                    .execute(room_id, connection_id, user_id, display_name, color)
                    .await?;
                return Ok(Some(participant.user_id));
            }
            (_, None) => return Err(IntentError::NotJoined),
            (ClientIntent::RequestState, Some(_)) => {
                self.request_state.execute(room_id, &connection_id).await?;
            }
            (ClientIntent::SubmitOperation(draft), Some(_)) => {
                self.submit_operation.execute(room_id, draft).await?;
            }
            (ClientIntent::Undo, Some(_)) => {
                self.undo_redo.undo(room_id).await?;
            }
            (ClientIntent::Redo, Some(_)) => {
                self.undo_redo.redo(room_id).await?;
            }
            (ClientIntent::PointerMove(point), Some(user_id)) => {
                self.pointer_move
                    .execute(room_id, &connection_id, user_id, point)
                    .await;
            }
        }
        Ok(None)
    }
}

pub struct SyncCoordinator {
    message_pusher: Arc<dyn MessagePusher>,
    handlers: Arc<IntentHandlers>,
    disconnect_participant: DisconnectParticipantUseCase,
}

impl SyncCoordinator {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        color_picker: Arc<dyn ColorPicker>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let sequencer = Arc::new(RoomSequencer::new());
        let handlers = IntentHandlers {
            join_room: JoinRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                sequencer.clone(),
                color_picker,
                clock.clone(),
            ),
            request_state: RequestStateUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                sequencer.clone(),
            ),
            submit_operation: SubmitOperationUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                sequencer.clone(),
                clock,
            ),
            undo_redo: UndoRedoUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                sequencer.clone(),
            ),
            pointer_move: PointerMoveUseCase::new(repository.clone(), message_pusher.clone()),
        };
        Self {
            handlers: Arc::new(handlers),
            disconnect_participant: DisconnectParticipantUseCase::new(
                repository,
                message_pusher.clone(),
                sequencer,
            ),
            message_pusher,
        }
    }

    /// 新しい接続を受け付け、送信キューを登録する
    pub async fn connect(&self, room_id: RoomId, sender: PusherChannel) -> ConnectionSession {
        let session = ConnectionSession::new(ConnectionId::generate(), room_id);
        self.message_pusher
            .register_client(session.connection_id, sender)
            .await;
        tracing::info!(
            "Connection '{}' opened for room '{}'",
            session.connection_id,
            session.room_id
        );
        session
    }

    /// 1 つの intent を処理する
    ///
    /// intent は別タスクで実行されるため、この future が途中で破棄されても
    /// 「適用してから配信」は最後まで完了する。破棄された intent の結果は、
    /// 同じセッションに対する次の `handle` か `disconnect` が回収する。
    ///
    /// エラーの場合、送信者への通知は呼び出し側が [`SyncCoordinator::reject`] で行う。
    pub async fn handle(
        &self,
        session: &mut ConnectionSession,
        intent: ClientIntent,
    ) -> Result<(), IntentError> {
        if session.state == ConnectionState::Disconnected {
            tracing::debug!(
                "Ignoring '{}' from disconnected connection '{}'",
                intent.name(),
                session.connection_id
            );
            return Ok(());
        }

        if let Err(e) = self.settle(session).await {
            tracing::warn!(
                "Interrupted intent from connection '{}' failed: {}",
                session.connection_id,
                e
            );
        }

        let joined_user = session.user_id().cloned();
        if joined_user.is_none() && !matches!(intent, ClientIntent::Join { .. }) {
            return Err(IntentError::NotJoined);
        }

        let handlers = self.handlers.clone();
        let room_id = session.room_id.clone();
        let connection_id = session.connection_id;
        session.in_flight = Some(tokio::spawn(async move {
            handlers
                .dispatch(&room_id, connection_id, joined_user, intent)
                .await
        }));
        self.settle(session).await
    }

    /// 処理中の intent の完了を待ち、結果をセッションに反映する
    async fn settle(&self, session: &mut ConnectionSession) -> Result<(), IntentError> {
        let Some(task) = session.in_flight.as_mut() else {
            return Ok(());
        };
        let outcome = task.await;
        session.in_flight = None;

        match outcome {
            Ok(Ok(Some(user_id))) => {
                if session.state != ConnectionState::Disconnected {
                    session.state = ConnectionState::Joined { user_id };
                }
                Ok(())
            }
            Ok(Ok(None)) => Ok(()),
            Ok(Err(e)) => Err(e),
            Err(e) => Err(IntentError::TaskFailed(e.to_string())),
        }
    }

    /// 処理できなかった intent を送信者にのみ通知する（内部エラーはログのみ）
    pub async fn reject(&self, session: &ConnectionSession, error: &IntentError) {
        let Some(reason) = error.reject_reason() else {
            tracing::error!(
                "Internal error while handling connection '{}' in room '{}': {}",
                session.connection_id,
                session.room_id,
                error
            );
            return;
        };
        tracing::warn!(
            "Rejected intent from connection '{}' ({}): {}",
            session.connection_id,
            reason.code(),
            error
        );

        if session.state == ConnectionState::Disconnected {
            return;
        }
        let event = RoomEvent::Rejected {
            reason,
            message: error.to_string(),
        };
        if let Err(e) = self
            .message_pusher
            .push_to(&session.connection_id, &event)
            .await
        {
            tracing::debug!(
                "Failed to push error to connection '{}': {}",
                session.connection_id,
                e
            );
        }
    }

    /// 接続を終了する。何度呼んでも安全
    ///
    /// 処理中の intent があれば、その完了を待ってから退出させる。
    pub async fn disconnect(&self, session: &mut ConnectionSession) {
        if session.state == ConnectionState::Disconnected {
            return;
        }
        if let Err(e) = self.settle(session).await {
            tracing::debug!(
                "Interrupted intent from connection '{}' failed: {}",
                session.connection_id,
                e
            );
        }
        session.state = ConnectionState::Disconnected;
        self.disconnect_participant
            .execute(&session.room_id, &session.connection_id)
            .await;
        tracing::info!("Connection '{}' closed", session.connection_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            Color, NewOperation, OperationKind, PaletteColorPicker, Point,
            SequentialOperationIdGenerator,
        },
        infrastructure::{
            dto::websocket::ServerMessage, message_pusher::WebSocketMessagePusher,
            repository::InMemoryRoomRepository,
        },
    };
    use rakugaki_shared::time::FixedClock;
    use std::{collections::HashMap, time::Duration};
    use tokio::sync::mpsc;

    struct Client {
        session: ConnectionSession,
        rx: mpsc::UnboundedReceiver<String>,
    }

    impl Client {
        fn next(&mut self) -> ServerMessage {
            let raw = self.rx.try_recv().expect("expected a pending message");
            serde_json::from_str(&raw).unwrap()
        }

        fn drain(&mut self) -> Vec<ServerMessage> {
            let mut messages = Vec::new();
            while let Ok(raw) = self.rx.try_recv() {
                messages.push(serde_json::from_str(&raw).unwrap());
            }
            messages
        }
    }

    fn create_coordinator() -> (Arc<SyncCoordinator>, Arc<InMemoryRoomRepository>) {
        create_coordinator_with_capacity(100)
    }

    type PusherClients = Arc<tokio::sync::Mutex<HashMap<ConnectionId, PusherChannel>>>;

    /// 送信キューの表を外から lock できる coordinator
    fn create_coordinator_with_clients() -> (
        Arc<SyncCoordinator>,
        Arc<InMemoryRoomRepository>,
        PusherClients,
    ) {
        let clients: PusherClients = Arc::new(tokio::sync::Mutex::new(HashMap::new()));
        let clock = Arc::new(FixedClock::new(1_000));
        let repository = Arc::new(InMemoryRoomRepository::new(
            Arc::new(SequentialOperationIdGenerator::new("op")),
            clock.clone(),
        ));
        let coordinator = SyncCoordinator::new(
            repository.clone(),
            Arc::new(WebSocketMessagePusher::new(clients.clone())),
            Arc::new(PaletteColorPicker::default()),
            clock,
        );
        (Arc::new(coordinator), repository, clients)
    }

    fn create_coordinator_with_capacity(
        capacity: usize,
    ) -> (Arc<SyncCoordinator>, Arc<InMemoryRoomRepository>) {
        let clock = Arc::new(FixedClock::new(1_000));
        let repository = Arc::new(
            InMemoryRoomRepository::new(
                Arc::new(SequentialOperationIdGenerator::new("op")),
                clock.clone(),
            )
            .with_participant_capacity(capacity),
        );
        let coordinator = SyncCoordinator::new(
            repository.clone(),
            Arc::new(WebSocketMessagePusher::default()),
            Arc::new(PaletteColorPicker::default()),
            clock,
        );
        (Arc::new(coordinator), repository)
    }

    fn room(value: &str) -> RoomId {
        RoomId::new(value.to_string()).unwrap()
    }

    fn user(value: &str) -> UserId {
        UserId::new(value.to_string()).unwrap()
    }

    fn join_intent(user_id: &str) -> ClientIntent {
        ClientIntent::Join {
            user_id: user(user_id),
            display_name: None,
            color: None,
        }
    }

    fn stroke(author: &str, x: f64) -> ClientIntent {
        ClientIntent::SubmitOperation(
            NewOperation::new(
                OperationKind::Stroke,
                vec![Point::new(x, 0.0), Point::new(x, 1.0)],
                Color::new("#000000"),
                2.0,
                user(author),
            )
            .unwrap(),
        )
    }

    async fn connect(coordinator: &SyncCoordinator, room_id: &str) -> Client {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = coordinator.connect(room(room_id), tx).await;
        Client { session, rx }
    }

    async fn connect_and_join(coordinator: &SyncCoordinator, room_id: &str, user_id: &str) -> Client {
        let mut client = connect(coordinator, room_id).await;
        coordinator
            .handle(&mut client.session, join_intent(user_id))
            .await
            .unwrap();
        client
    }

    fn roster(message: ServerMessage) -> Vec<String> {
        match message {
            ServerMessage::Users { users } => users.into_iter().map(|u| u.user_id).collect(),
            other => panic!("expected users message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_join_transitions_to_joined_and_broadcasts_roster() {
        // テスト項目: join で Joined に遷移し、参加者自身を含む全員に参加者リストが届く
        // given (前提条件):
        let (coordinator, _) = create_coordinator();
        let mut alice = connect_and_join(&coordinator, "main", "alice").await;
        alice.drain();
        let mut bob = connect(&coordinator, "main").await;

        // when (操作):
        coordinator
            .handle(&mut bob.session, join_intent("bob"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(
            bob.session.state(),
            &ConnectionState::Joined { user_id: user("bob") }
        );
        assert_eq!(roster(alice.next()), vec!["alice", "bob"]);
        assert_eq!(roster(bob.next()), vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_intent_before_join_is_rejected_to_sender_only() {
        // テスト項目: join 前の intent は NotJoined となり、送信者にのみ error が届く
        // given (前提条件):
        let (coordinator, repository) = create_coordinator();
        let mut alice = connect_and_join(&coordinator, "main", "alice").await;
        alice.drain();
        let mut stranger = connect(&coordinator, "main").await;

        // when (操作):
        let error = coordinator
            .handle(&mut stranger.session, stroke("stranger", 1.0))
            .await
            .unwrap_err();
        coordinator.reject(&stranger.session, &error).await;

        // then (期待する結果):
        assert_eq!(error, IntentError::NotJoined);
        match stranger.next() {
            ServerMessage::Error { code, .. } => assert_eq!(code, "not-joined"),
            other => panic!("expected error message, got {:?}", other),
        }
        assert!(alice.drain().is_empty());
        assert!(repository.snapshot(&room("main")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_intent_is_rejected_to_sender_only() {
        // テスト項目: 不正な形式の intent は送信者にのみ通知され、ログも変化しない
        // given (前提条件):
        let (coordinator, repository) = create_coordinator();
        let mut alice = connect_and_join(&coordinator, "main", "alice").await;
        let mut bob = connect_and_join(&coordinator, "main", "bob").await;
        alice.drain();
        bob.drain();

        // when (操作):
        let error = IntentError::Malformed("operation path must not be empty".to_string());
        coordinator.reject(&alice.session, &error).await;

        // then (期待する結果):
        match alice.next() {
            ServerMessage::Error { code, message } => {
                assert_eq!(code, "malformed-intent");
                assert!(message.contains("path"));
            }
            other => panic!("expected error message, got {:?}", other),
        }
        assert!(bob.drain().is_empty());
        assert!(repository.snapshot(&room("main")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_operation_is_broadcast_to_all_including_sender() {
        // テスト項目: 操作は送信者を含む全員に remote-operation として届く
        // given (前提条件):
        let (coordinator, _) = create_coordinator();
        let mut alice = connect_and_join(&coordinator, "main", "alice").await;
        let mut bob = connect_and_join(&coordinator, "main", "bob").await;
        alice.drain();
        bob.drain();

        // when (操作):
        coordinator
            .handle(&mut alice.session, stroke("alice", 1.0))
            .await
            .unwrap();

        // then (期待する結果):
        for client in [&mut alice, &mut bob] {
            match client.next() {
                ServerMessage::RemoteOperation(op) => {
                    assert_eq!(op.id, "op-1");
                    assert_eq!(op.author_id, "alice");
                    assert!(op.active);
                }
                other => panic!("expected remote-operation, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_undo_broadcasts_delta_and_empty_undo_is_silent() {
        // テスト項目: undo は差分を全員に配信し、対象が無い undo は何も配信しない
        // given (前提条件):
        let (coordinator, _) = create_coordinator();
        let mut alice = connect_and_join(&coordinator, "main", "alice").await;
        let mut bob = connect_and_join(&coordinator, "main", "bob").await;
        coordinator
            .handle(&mut alice.session, stroke("alice", 1.0))
            .await
            .unwrap();
        alice.drain();
        bob.drain();

        // when (操作): bob が alice の操作を undo（undo は Room 全体に作用する）
        coordinator
            .handle(&mut bob.session, ClientIntent::Undo)
            .await
            .unwrap();
        let first = alice.drain();
        coordinator
            .handle(&mut bob.session, ClientIntent::Undo)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(first.len(), 1);
        match &first[0] {
            ServerMessage::UndoRedo {
                operation_id,
                active,
            } => {
                assert_eq!(operation_id, "op-1");
                assert!(!active);
            }
            other => panic!("expected undo-redo, got {:?}", other),
        }
        assert!(alice.drain().is_empty());
        assert_eq!(bob.drain().len(), 1);
    }

    #[tokio::test]
    async fn test_request_state_replies_only_to_requester() {
        // テスト項目: request-state の応答は要求者にのみ届き、その時点のログ全体を含む
        // given (前提条件):
        let (coordinator, _) = create_coordinator();
        let mut alice = connect_and_join(&coordinator, "main", "alice").await;
        let mut bob = connect_and_join(&coordinator, "main", "bob").await;
        for x in [1.0, 2.0] {
            coordinator
                .handle(&mut alice.session, stroke("alice", x))
                .await
                .unwrap();
        }
        coordinator
            .handle(&mut alice.session, ClientIntent::Undo)
            .await
            .unwrap();
        alice.drain();
        bob.drain();

        // when (操作):
        coordinator
            .handle(&mut bob.session, ClientIntent::RequestState)
            .await
            .unwrap();

        // then (期待する結果):
        match bob.next() {
            ServerMessage::InitState { operations } => {
                let ids: Vec<&str> = operations.iter().map(|op| op.id.as_str()).collect();
                assert_eq!(ids, vec!["op-1", "op-2"]);
                assert!(operations[0].active);
                assert!(!operations[1].active);
            }
            other => panic!("expected init-state, got {:?}", other),
        }
        assert!(alice.drain().is_empty());
    }

    #[tokio::test]
    async fn test_pointer_never_reaches_sender() {
        // テスト項目: ポインタ位置は送信者以外にのみ届き、送信者の userId が付与される
        // given (前提条件):
        let (coordinator, repository) = create_coordinator();
        let mut alice = connect_and_join(&coordinator, "main", "alice").await;
        let mut bob = connect_and_join(&coordinator, "main", "bob").await;
        alice.drain();
        bob.drain();

        // when (操作):
        coordinator
            .handle(
                &mut alice.session,
                ClientIntent::PointerMove(Point::new(3.0, 4.0)),
            )
            .await
            .unwrap();

        // then (期待する結果):
        match bob.next() {
            ServerMessage::Pointer { user_id, x, y } => {
                assert_eq!(user_id, "alice");
                assert_eq!((x, y), (3.0, 4.0));
            }
            other => panic!("expected pointer, got {:?}", other),
        }
        assert!(alice.drain().is_empty());
        assert!(repository.snapshot(&room("main")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_broadcasts_roster_to_remaining_members() {
        // テスト項目: 切断すると残りの参加者にのみ更新後の参加者リストが届き、ログは変化しない
        // given (前提条件):
        let (coordinator, repository) = create_coordinator();
        let mut alice = connect_and_join(&coordinator, "main", "alice").await;
        let mut bob = connect_and_join(&coordinator, "main", "bob").await;
        coordinator
            .handle(&mut alice.session, stroke("alice", 1.0))
            .await
            .unwrap();
        alice.drain();
        bob.drain();

        // when (操作):
        coordinator.disconnect(&mut alice.session).await;

        // then (期待する結果):
        assert_eq!(alice.session.state(), &ConnectionState::Disconnected);
        assert_eq!(roster(bob.next()), vec!["bob"]);
        assert!(alice.drain().is_empty());
        assert_eq!(repository.snapshot(&room("main")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_intents_after_disconnect_are_ignored() {
        // テスト項目: Disconnected 以降の intent は無視される
        // given (前提条件):
        let (coordinator, repository) = create_coordinator();
        let mut alice = connect_and_join(&coordinator, "main", "alice").await;
        coordinator.disconnect(&mut alice.session).await;

        // when (操作):
        let result = coordinator
            .handle(&mut alice.session, stroke("alice", 1.0))
            .await;
        coordinator.disconnect(&mut alice.session).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(repository.snapshot(&room("main")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_join_to_full_room_stays_unjoined() {
        // テスト項目: 定員超過の join は RoomFull となり、接続は Unjoined のまま
        // given (前提条件):
        let (coordinator, _) = create_coordinator_with_capacity(1);
        let _alice = connect_and_join(&coordinator, "main", "alice").await;
        let mut bob = connect(&coordinator, "main").await;

        // when (操作):
        let error = coordinator
            .handle(&mut bob.session, join_intent("bob"))
            .await
            .unwrap_err();
        coordinator.reject(&bob.session, &error).await;

        // then (期待する結果):
        assert_eq!(error, IntentError::RoomFull { capacity: 1 });
        assert_eq!(bob.session.state(), &ConnectionState::Unjoined);
        match bob.next() {
            ServerMessage::Error { code, .. } => assert_eq!(code, "room-full"),
            other => panic!("expected error message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        // テスト項目: 別の Room の操作や参加者リストは届かない
        // given (前提条件):
        let (coordinator, repository) = create_coordinator();
        let mut alice = connect_and_join(&coordinator, "main", "alice").await;
        let mut carol = connect_and_join(&coordinator, "side", "carol").await;
        alice.drain();
        carol.drain();

        // when (操作):
        coordinator
            .handle(&mut carol.session, stroke("carol", 1.0))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(alice.drain().is_empty());
        assert_eq!(carol.drain().len(), 1);
        assert!(repository.snapshot(&room("main")).await.unwrap().is_empty());
        assert_eq!(repository.snapshot(&room("side")).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_are_broadcast_in_apply_order() {
        // テスト項目: 複数の送信者からの同時送信が、全員にログと同じ順序で届く
        // given (前提条件):
        let (coordinator, repository) = create_coordinator();
        let mut observer = connect_and_join(&coordinator, "main", "observer").await;
        let mut senders = Vec::new();
        for name in ["alice", "bob", "carol"] {
            senders.push(connect_and_join(&coordinator, "main", name).await);
        }
        observer.drain();
        for sender in senders.iter_mut() {
            sender.drain();
        }

        // when (操作):
        let mut handles = Vec::new();
        for (index, mut sender) in senders.into_iter().enumerate() {
            let coordinator = coordinator.clone();
            handles.push(tokio::spawn(async move {
                let author = sender.session.user_id().unwrap().as_str().to_string();
                for i in 0..10 {
                    coordinator
                        .handle(&mut sender.session, stroke(&author, (index * 10 + i) as f64))
                        .await
                        .unwrap();
                }
                sender
            }));
        }
        let mut senders = Vec::new();
        for handle in handles {
            senders.push(handle.await.unwrap());
        }

        // then (期待する結果):
        let log_order: Vec<String> = repository
            .snapshot(&room("main"))
            .await
            .unwrap()
            .iter()
            .map(|op| op.id().as_str().to_string())
            .collect();
        assert_eq!(log_order.len(), 30);

        let received_order = |client: &mut Client| -> Vec<String> {
            client
                .drain()
                .into_iter()
                .filter_map(|msg| match msg {
                    ServerMessage::RemoteOperation(op) => Some(op.id),
                    _ => None,
                })
                .collect()
        };
        assert_eq!(received_order(&mut observer), log_order);
        for sender in senders.iter_mut() {
            assert_eq!(received_order(sender), log_order);
        }
    }

    #[tokio::test]
    async fn test_dropped_submit_still_broadcasts_after_apply() {
        // テスト項目: 配信待ちの途中で handle の future が破棄されても、適用済みの操作は全員に配信される
        // given (前提条件):
        let (coordinator, repository, clients) = create_coordinator_with_clients();
        let mut alice = connect_and_join(&coordinator, "main", "alice").await;
        let mut bob = connect_and_join(&coordinator, "main", "bob").await;
        alice.drain();
        bob.drain();

        // when (操作):
        let busy = clients.lock().await;
        tokio::select! {
            _ = coordinator.handle(&mut alice.session, stroke("alice", 1.0)) => {
                panic!("submit should wait for the pusher");
            }
            _ = tokio::time::sleep(Duration::from_millis(50)) => {}
        }
        drop(busy);
        coordinator.disconnect(&mut alice.session).await;

        // then (期待する結果):
        assert_eq!(repository.snapshot(&room("main")).await.unwrap().len(), 1);
        let received = bob.drain();
        assert!(matches!(
            received.first(),
            Some(ServerMessage::RemoteOperation(op)) if op.id == "op-1"
        ));
        assert_eq!(roster(received[1].clone()), vec!["bob"]);
    }

    #[tokio::test]
    async fn test_dropped_join_is_settled_before_next_intent() {
        // テスト項目: 途中で破棄された join は次の intent の前に完了し、Joined として扱われる
        // given (前提条件):
        let (coordinator, repository, clients) = create_coordinator_with_clients();
        let mut alice = connect(&coordinator, "main").await;

        let busy = clients.lock().await;
        tokio::select! {
            _ = coordinator.handle(&mut alice.session, join_intent("alice")) => {
                panic!("join should wait for the pusher");
            }
            _ = tokio::time::sleep(Duration::from_millis(50)) => {}
        }
        drop(busy);

        // when (操作):
        coordinator
            .handle(&mut alice.session, stroke("alice", 1.0))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(
            alice.session.state(),
            &ConnectionState::Joined { user_id: user("alice") }
        );
        assert_eq!(repository.snapshot(&room("main")).await.unwrap().len(), 1);
        let received = alice.drain();
        assert_eq!(roster(received[0].clone()), vec!["alice"]);
        assert!(matches!(received[1], ServerMessage::RemoteOperation(_)));
    }
}
