//! UseCase layer: one struct per client intent, plus the `SyncCoordinator`
//! that drives them from a connection's state.

pub mod disconnect_participant;
pub mod error;
pub mod get_room_detail;
pub mod get_room_snapshot;
pub mod get_rooms;
pub mod intent;
pub mod join_room;
pub mod pointer_move;
pub mod request_state;
pub mod sequencer;
pub mod submit_operation;
pub mod sync_coordinator;
pub mod undo_redo;

pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{GetRoomDetailError, IntentError};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_room_snapshot::GetRoomSnapshotUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use intent::ClientIntent;
pub use join_room::JoinRoomUseCase;
pub use pointer_move::PointerMoveUseCase;
pub use request_state::RequestStateUseCase;
pub use sequencer::RoomSequencer;
pub use submit_operation::SubmitOperationUseCase;
pub use sync_coordinator::{ConnectionSession, ConnectionState, SyncCoordinator};
pub use undo_redo::UndoRedoUseCase;
