//! Membership
//!
//! 接続（`ConnectionId`）と参加者メタデータ（ユーザー ID、表示名、色）の対応を管理します。
//! 描画データについては何も知りません。

use std::collections::HashMap;

use super::value_object::{Color, ConnectionId, DisplayName, Timestamp, UserId};

/// Participant Entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub display_name: DisplayName,
    pub color: Color,
    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(
        connection_id: ConnectionId,
        user_id: UserId,
        display_name: DisplayName,
        color: Color,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            connection_id,
            user_id,
            display_name,
            color,
            joined_at,
        }
    }
}

/// Presence bookkeeping for a single room.
#[derive(Debug, Clone, Default)]
pub struct Membership {
    participants: HashMap<ConnectionId, Participant>,
}

impl Membership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the participant for its connection.
    ///
    /// Returns `true` when the connection was not a member before.
    pub fn join(&mut self, participant: Participant) -> bool {
        self.participants
            .insert(participant.connection_id, participant)
            .is_none()
    }

    /// Remove the participant; `None` when the connection was not a member.
    pub fn leave(&mut self, connection_id: &ConnectionId) -> Option<Participant> {
        self.participants.remove(connection_id)
    }

    /// Roster snapshot, sorted by user id then connection id.
    pub fn list(&self) -> Vec<Participant> {
        let mut participants: Vec<Participant> = self.participants.values().cloned().collect();
        participants.sort_by(|a, b| {
            a.user_id
                .cmp(&b.user_id)
                .then_with(|| a.connection_id.cmp(&b.connection_id))
        });
        participants
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&Participant> {
        self.participants.get(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.participants.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
