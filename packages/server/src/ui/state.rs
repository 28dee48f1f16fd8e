//! Shared application state.

use std::sync::Arc;

use crate::{
    domain::RoomId,
    usecase::{GetRoomDetailUseCase, GetRoomSnapshotUseCase, GetRoomsUseCase, SyncCoordinator},
};

/// Shared application state
pub struct AppState {
    /// 接続ごとの intent を処理する
    pub coordinator: Arc<SyncCoordinator>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// GetRoomSnapshotUseCase（操作ログ取得のユースケース）
    pub get_room_snapshot_usecase: Arc<GetRoomSnapshotUseCase>,
    /// `?room=` が省略されたときに参加する Room
    pub default_room: RoomId,
}
