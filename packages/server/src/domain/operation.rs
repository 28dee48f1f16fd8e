//! Operation Entity
//!
//! 1 本のストローク、または消しゴム操作を表します。
//! 作成後に変更可能なのは `active` フラグのみで、それも `OperationLog` 経由でしか変わりません。

use serde::{Deserialize, Serialize};

use super::{
    error::OperationError,
    value_object::{Color, OperationId, Point, Timestamp, UserId},
};

/// 描画操作の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Stroke,
    Erase,
}

/// A validated operation that has not entered the log yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOperation {
    pub(super) id: Option<OperationId>,
    pub(super) kind: OperationKind,
    pub(super) path: Vec<Point>,
    pub(super) color: Color,
    pub(super) width: f64,
    pub(super) author_id: UserId,
}

impl NewOperation {
    /// Validate the drawing payload.
    ///
    /// The path must be non-empty and every number finite so the operation can
    /// be echoed back as JSON. Color and width are otherwise opaque.
    pub fn new(
        kind: OperationKind,
        path: Vec<Point>,
        color: Color,
        width: f64,
        author_id: UserId,
    ) -> Result<Self, OperationError> {
        if path.is_empty() {
            return Err(OperationError::EmptyPath);
        }
        if path.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(OperationError::NonFinitePoint);
        }
        if !width.is_finite() {
            return Err(OperationError::InvalidWidth);
        }

        Ok(Self {
            id: None,
            kind,
            path,
            color,
            width,
            author_id,
        })
    }

    /// Keep a client-proposed id (the log still replaces it on collision).
    pub fn with_id(mut self, id: OperationId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }
}

/// An operation stored in the authoritative log.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    id: OperationId,
    kind: OperationKind,
    path: Vec<Point>,
    color: Color,
    width: f64,
    author_id: UserId,
    created_at: Timestamp,
    active: bool,
}

impl Operation {
    pub(super) fn create(draft: NewOperation, id: OperationId, created_at: Timestamp) -> Self {
        Self {
            id,
            kind: draft.kind,
            path: draft.path,
            color: draft.color,
            width: draft.width,
            author_id: draft.author_id,
            created_at,
            active: true,
        }
    }

    pub(super) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn id(&self) -> &OperationId {
        &self.id
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn path(&self) -> &[Point] {
        &self.path
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
