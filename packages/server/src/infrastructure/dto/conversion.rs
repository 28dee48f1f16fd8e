//! Conversion logic between DTOs and domain entities / intents.

use crate::domain::{
    Color, DisplayName, NewOperation, Operation, OperationId, Participant, Point, RoomEvent,
    UserId,
};
use crate::infrastructure::dto::websocket as dto;
use crate::usecase::{ClientIntent, IntentError};

// ========================================
// DTO → Domain / Intent
// ========================================

impl From<dto::PointDto> for Point {
    fn from(dto: dto::PointDto) -> Self {
        Point::new(dto.x, dto.y)
    }
}

impl TryFrom<dto::OperationPayload> for NewOperation {
    type Error = IntentError;

    fn try_from(payload: dto::OperationPayload) -> Result<Self, Self::Error> {
        let author_id = payload
            .author_id
            .ok_or_else(|| IntentError::Malformed("operation is missing authorId".to_string()))?;
        let author_id = UserId::new(author_id)
            .map_err(|e| IntentError::Malformed(format!("invalid authorId: {}", e)))?;

        let draft = NewOperation::new(
            payload.kind,
            payload.path.into_iter().map(Point::from).collect(),
            Color::new(payload.color),
            payload.width,
            author_id,
        )
        .map_err(|e| IntentError::Malformed(e.to_string()))?;

        match payload.id {
            Some(id) => {
                let id = OperationId::new(id)
                    .map_err(|e| IntentError::Malformed(format!("invalid operation id: {}", e)))?;
                Ok(draft.with_id(id))
            }
            None => Ok(draft),
        }
    }
}

impl TryFrom<dto::ClientMessage> for ClientIntent {
    type Error = IntentError;

    fn try_from(msg: dto::ClientMessage) -> Result<Self, Self::Error> {
        match msg {
            dto::ClientMessage::Join {
                user_id,
                display_name,
                color,
            } => {
                let user_id = user_id
                    .ok_or_else(|| IntentError::Malformed("join is missing userId".to_string()))?;
                let user_id = UserId::new(user_id)
                    .map_err(|e| IntentError::Malformed(format!("invalid userId: {}", e)))?;
                let display_name = display_name
                    .map(DisplayName::new)
                    .transpose()
                    .map_err(|e| IntentError::Malformed(format!("invalid displayName: {}", e)))?;
                let color = color.filter(|c| !c.trim().is_empty()).map(Color::new);

                Ok(ClientIntent::Join {
                    user_id,
                    display_name,
                    color,
                })
            }
            dto::ClientMessage::RequestState => Ok(ClientIntent::RequestState),
            dto::ClientMessage::Operation(payload) => {
                Ok(ClientIntent::SubmitOperation(payload.try_into()?))
            }
            dto::ClientMessage::Pointer(point) => {
                if !point.x.is_finite() || !point.y.is_finite() {
                    return Err(IntentError::Malformed(
                        "pointer coordinates must be finite".to_string(),
                    ));
                }
                Ok(ClientIntent::PointerMove(point.into()))
            }
            dto::ClientMessage::Undo => Ok(ClientIntent::Undo),
            dto::ClientMessage::Redo => Ok(ClientIntent::Redo),
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<Point> for dto::PointDto {
    fn from(point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
        }
    }
}

impl From<&Operation> for dto::OperationDto {
    fn from(op: &Operation) -> Self {
        Self {
            id: op.id().as_str().to_string(),
            kind: op.kind(),
            path: op.path().iter().copied().map(dto::PointDto::from).collect(),
            color: op.color().as_str().to_string(),
            width: op.width(),
            author_id: op.author_id().as_str().to_string(),
            created_at: op.created_at().value(),
            active: op.is_active(),
        }
    }
}

impl From<&Participant> for dto::ParticipantDto {
    fn from(p: &Participant) -> Self {
        Self {
            connection_id: p.connection_id.to_string(),
            user_id: p.user_id.as_str().to_string(),
            display_name: p.display_name.as_str().to_string(),
            color: p.color.as_str().to_string(),
            joined_at: p.joined_at.value(),
        }
    }
}

impl From<&RoomEvent> for dto::ServerMessage {
    fn from(event: &RoomEvent) -> Self {
        match event {
            RoomEvent::InitState { operations } => dto::ServerMessage::InitState {
                operations: operations.iter().map(dto::OperationDto::from).collect(),
            },
            RoomEvent::RemoteOperation(op) => dto::ServerMessage::RemoteOperation(op.into()),
            RoomEvent::UndoRedo {
                operation_id,
                active,
            } => dto::ServerMessage::UndoRedo {
                operation_id: operation_id.as_str().to_string(),
                active: *active,
            },
            RoomEvent::Users(participants) => dto::ServerMessage::Users {
                users: participants.iter().map(dto::ParticipantDto::from).collect(),
            },
            RoomEvent::Pointer { user_id, point } => dto::ServerMessage::Pointer {
                user_id: user_id.as_str().to_string(),
                x: point.x,
                y: point.y,
            },
            RoomEvent::Rejected { reason, message } => dto::ServerMessage::Error {
                code: reason.code().to_string(),
                message: message.clone(),
            },
        }
    }
}
