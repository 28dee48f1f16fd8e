//! Domain layer: entities, value objects, and the ports the use cases depend on.

pub mod error;
pub mod event;
pub mod factory;
pub mod membership;
pub mod message_pusher;
pub mod operation;
pub mod operation_log;
pub mod repository;
pub mod room;
pub mod value_object;

pub use error::{
    MessagePushError, OperationError, RepositoryError, RoomError, ValueObjectError,
};
pub use event::{RejectReason, RoomEvent};
pub use factory::{
    ColorPicker, OperationIdGenerator, PaletteColorPicker, RandomColorPicker,
    SequentialOperationIdGenerator, UuidOperationIdGenerator,
};
pub use membership::{Membership, Participant};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use operation::{NewOperation, Operation, OperationKind};
pub use operation_log::OperationLog;
pub use repository::RoomRepository;
pub use room::{DEFAULT_PARTICIPANT_CAPACITY, Room};
pub use value_object::{
    Color, ConnectionId, DisplayName, OperationId, Point, RoomId, Timestamp, UserId,
};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
