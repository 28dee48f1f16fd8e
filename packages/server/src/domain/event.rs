//! Outbound room events.
//!
//! UseCase 層が生成し、MessagePusher がワイヤ形式に変換して配送します。

use super::{
    membership::Participant,
    operation::Operation,
    value_object::{OperationId, Point, UserId},
};

/// Why an intent was rejected. Only the sender is told.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MalformedIntent,
    NotJoined,
    RoomFull,
}

impl RejectReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedIntent => "malformed-intent",
            Self::NotJoined => "not-joined",
            Self::RoomFull => "room-full",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// Full log snapshot; replaces the receiver's replica.
    InitState { operations: Vec<Operation> },
    /// One authoritative operation to append.
    RemoteOperation(Operation),
    /// Undo/redo delta.
    UndoRedo {
        operation_id: OperationId,
        active: bool,
    },
    /// Full roster.
    Users(Vec<Participant>),
    /// Ephemeral cursor position.
    Pointer { user_id: UserId, point: Point },
    Rejected {
        reason: RejectReason,
        message: String,
    },
}

impl RoomEvent {
    /// Delta for an operation whose `active` flag just flipped.
    pub fn undo_redo(operation: &Operation) -> Self {
        Self::UndoRedo {
            operation_id: operation.id().clone(),
            active: operation.is_active(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::InitState { .. } => "init-state",
            Self::RemoteOperation(_) => "remote-operation",
            Self::UndoRedo { .. } => "undo-redo",
            Self::Users(_) => "users",
            Self::Pointer { .. } => "pointer",
            Self::Rejected { .. } => "error",
        }
    }
}
