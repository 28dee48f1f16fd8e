//! Local replica of a room's operation log.
//!
//! After every (re)connect the replica waits for `init-state`. Deltas that
//! arrive before the snapshot are dropped, since the snapshot already contains
//! them. A delta that cannot be reconciled puts the replica back into
//! `AwaitingSnapshot` and the caller is expected to send `request-state`.

use rakugaki_server::infrastructure::dto::websocket::OperationDto;

use crate::error::DesyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    AwaitingSnapshot,
    Synced,
}

/// Whether a delta changed the replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Dropped while awaiting a snapshot
    Ignored,
}

#[derive(Debug, Clone)]
pub struct CanvasReplica {
    operations: Vec<OperationDto>,
    state: SyncState,
}

impl Default for CanvasReplica {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasReplica {
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
            state: SyncState::AwaitingSnapshot,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Drop deltas until the next `init-state`.
    pub fn begin_resync(&mut self) {
        self.state = SyncState::AwaitingSnapshot;
    }

    /// Replace the whole replica with an authoritative snapshot.
    pub fn apply_init_state(&mut self, operations: Vec<OperationDto>) {
        self.operations = operations;
        self.state = SyncState::Synced;
    }

    pub fn apply_remote_operation(
        &mut self,
        operation: OperationDto,
    ) -> Result<ApplyOutcome, DesyncError> {
        if self.state == SyncState::AwaitingSnapshot {
            return Ok(ApplyOutcome::Ignored);
        }
        if self.position(&operation.id).is_some() {
            self.state = SyncState::AwaitingSnapshot;
            return Err(DesyncError::DuplicateOperation(operation.id));
        }
        self.operations.push(operation);
        Ok(ApplyOutcome::Applied)
    }

    pub fn apply_undo_redo(
        &mut self,
        operation_id: &str,
        active: bool,
    ) -> Result<ApplyOutcome, DesyncError> {
        if self.state == SyncState::AwaitingSnapshot {
            return Ok(ApplyOutcome::Ignored);
        }
        match self.position(operation_id) {
            Some(index) => {
                self.operations[index].active = active;
                Ok(ApplyOutcome::Applied)
            }
            None => {
                self.state = SyncState::AwaitingSnapshot;
                Err(DesyncError::UnknownOperation(operation_id.to_string()))
            }
        }
    }

    pub fn operations(&self) -> &[OperationDto] {
        &self.operations
    }

    /// Operations that currently contribute to the rendered canvas, in log order.
    pub fn visible_operations(&self) -> impl Iterator<Item = &OperationDto> {
        self.operations.iter().filter(|op| op.active)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    fn position(&self, operation_id: &str) -> Option<usize> {
        self.operations.iter().position(|op| op.id == operation_id)
    }
}
