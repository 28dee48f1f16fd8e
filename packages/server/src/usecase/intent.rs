//! Client intents accepted by the `SyncCoordinator`.

use crate::domain::{Color, DisplayName, NewOperation, Point, UserId};

/// A validated request from one connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientIntent {
    Join {
        user_id: UserId,
        display_name: Option<DisplayName>,
        color: Option<Color>,
    },
    RequestState,
    SubmitOperation(NewOperation),
    Undo,
    Redo,
    PointerMove(Point),
}

impl ClientIntent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::RequestState => "request-state",
            Self::SubmitOperation(_) => "operation",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::PointerMove(_) => "pointer",
        }
    }
}
