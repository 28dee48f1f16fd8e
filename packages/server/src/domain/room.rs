//! Room Entity
//!
//! 1 つの `OperationLog` と 1 つの `Membership` を所有する分離単位です。
//! Room をまたいで操作・カーソル・参加者の状態が共有されることはありません。

use super::{
    error::RoomError,
    factory::OperationIdGenerator,
    membership::{Membership, Participant},
    operation::{NewOperation, Operation},
    operation_log::OperationLog,
    value_object::{ConnectionId, RoomId, Timestamp},
};

/// Default number of simultaneous connections per room.
pub const DEFAULT_PARTICIPANT_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub created_at: Timestamp,
    pub participant_capacity: usize,
    log: OperationLog,
    membership: Membership,
}

impl Room {
    pub fn with_capacity(id: RoomId, created_at: Timestamp, participant_capacity: usize) -> Self {
        Self {
            id,
            created_at,
            participant_capacity,
            log: OperationLog::new(),
            membership: Membership::new(),
        }
    }

    /// Upsert a participant. Only a connection that is not yet a member counts
    /// against the capacity.
    pub fn join(&mut self, participant: Participant) -> Result<(), RoomError> {
        if !self.membership.contains(&participant.connection_id)
            && self.membership.len() >= self.participant_capacity
        {
            return Err(RoomError::Full {
                capacity: self.participant_capacity,
            });
        }
        self.membership.join(participant);
        Ok(())
    }

    pub fn leave(&mut self, connection_id: &ConnectionId) -> Option<Participant> {
        self.membership.leave(connection_id)
    }

    pub fn append(
        &mut self,
        draft: NewOperation,
        ids: &dyn OperationIdGenerator,
        created_at: Timestamp,
    ) -> Operation {
        self.log.append(draft, ids, created_at)
    }

    pub fn undo(&mut self) -> Option<Operation> {
        self.log.undo()
    }

    pub fn redo(&mut self) -> Option<Operation> {
        self.log.redo()
    }

    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }
}
