//! Domain error types.

use thiserror::Error;

/// Value Object の生成に失敗した場合のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{kind} must be at most {max} characters")]
    TooLong { kind: &'static str, max: usize },
}

/// Operation の検証エラー（OperationLog に到達する前に弾かれる）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("operation path must contain at least one point")]
    EmptyPath,

    #[error("operation path contains a non-finite coordinate")]
    NonFinitePoint,

    #[error("operation width must be a finite number")]
    InvalidWidth,
}

/// Room の不変条件違反
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room is full (capacity: {capacity})")]
    Full { capacity: usize },
}

/// Repository 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("room not found: {0}")]
    RoomNotFound(String),

    #[error(transparent)]
    Room(#[from] RoomError),
}

/// MessagePusher 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client not found: {0}")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),

    #[error("failed to encode message: {0}")]
    Encode(String),
}
