//! OperationLog
//!
//! 描画操作の順序付き追記ログと、線形の undo/redo カーソルを保持します。
//! ネットワークや Room については何も知りません。
//!
//! ## 順序
//!
//! 順序の唯一の根拠は挿入位置（インデックス）です。`created_at` は順序付けに使いません。
//!
//! ## undo/redo
//!
//! 参加者ごとのスタックではなく、ログ全体に対する「最後に編集したものが勝つ」方式です。
//!
//! - `undo`: 末尾から後方に走査し、最初の active な操作を inactive にし、カーソルをその位置に置く
//! - `redo`: カーソルから前方に走査し、最初の inactive な操作を active にし、カーソルをその次に置く
//! - `append`: カーソルを常に末尾に移動する（それ以前の undo 済み操作は redo で拾われなくなる）

use super::{
    factory::OperationIdGenerator,
    operation::{NewOperation, Operation},
    value_object::{OperationId, Timestamp},
};

/// Append-only operation log with an undo/redo cursor.
///
/// Invariant: `cursor <= operations.len()`.
#[derive(Debug, Clone, Default)]
pub struct OperationLog {
    operations: Vec<Operation>,
    cursor: usize,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new operation and move the cursor to the end.
    ///
    /// A client-proposed id is kept unless it already exists in the log, in
    /// which case a fresh one is drawn from `ids`. The stored operation is
    /// always active.
    pub fn append(
        &mut self,
        mut draft: NewOperation,
        ids: &dyn OperationIdGenerator,
        created_at: Timestamp,
    ) -> Operation {
        let id = match draft.id.take() {
            Some(id) if !self.contains(&id) => id,
            _ => self.fresh_id(ids, created_at),
        };

        let operation = Operation::create(draft, id, created_at);
        self.operations.push(operation.clone());
        self.cursor = self.operations.len();
        operation
    }

    /// Deactivate the most recent active operation.
    ///
    /// Returns `None` when nothing is active; the cursor is left untouched.
    pub fn undo(&mut self) -> Option<Operation> {
        let index = self.operations.iter().rposition(Operation::is_active)?;
        let operation = &mut self.operations[index];
        operation.set_active(false);
        self.cursor = index;
        Some(operation.clone())
    }

    /// Reactivate the first inactive operation at or after the cursor.
    ///
    /// Returns `None` when no such operation exists; the cursor is left untouched.
    pub fn redo(&mut self) -> Option<Operation> {
        let offset = self.operations[self.cursor..]
            .iter()
            .position(|op| !op.is_active())?;
        let index = self.cursor + offset;
        let operation = &mut self.operations[index];
        operation.set_active(true);
        self.cursor = index + 1;
        Some(operation.clone())
    }

    /// Copy of the full log in insertion order.
    pub fn snapshot(&self) -> Vec<Operation> {
        self.operations.clone()
    }

    pub fn get(&self, id: &OperationId) -> Option<&Operation> {
        self.operations.iter().find(|op| op.id() == id)
    }

    pub fn contains(&self, id: &OperationId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn active_count(&self) -> usize {
        self.operations.iter().filter(|op| op.is_active()).count()
    }

    fn fresh_id(&self, ids: &dyn OperationIdGenerator, created_at: Timestamp) -> OperationId {
        loop {
            let id = ids.next_id(created_at);
            if !self.contains(&id) {
                return id;
            }
            tracing::debug!("Operation id '{}' already in use, drawing another", id);
        }
    }
}
