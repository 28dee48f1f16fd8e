//! Remote cursor tracking.
//!
//! Pointer events are never logged. A cursor disappears once its owner has
//! been silent for the inactivity window; expired entries are purged lazily
//! when cursors are read.

use std::collections::HashMap;

use rakugaki_server::infrastructure::dto::websocket::PointDto;

/// Inactivity window after which a remote cursor is hidden.
pub const CURSOR_TTL_MILLIS: i64 = 1500;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub point: PointDto,
    pub last_seen: i64,
}

#[derive(Debug, Clone)]
pub struct CursorTracker {
    cursors: HashMap<String, Cursor>,
    ttl_millis: i64,
}

impl Default for CursorTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::with_ttl(CURSOR_TTL_MILLIS)
    }

    pub fn with_ttl(ttl_millis: i64) -> Self {
        Self {
            cursors: HashMap::new(),
            ttl_millis,
        }
    }

    /// Record the latest position for a user.
    pub fn update(&mut self, user_id: impl Into<String>, point: PointDto, now: i64) {
        self.cursors.insert(
            user_id.into(),
            Cursor {
                point,
                last_seen: now,
            },
        );
    }

    /// Live cursors sorted by user id. Expired ones are dropped first.
    pub fn visible(&mut self, now: i64) -> Vec<(String, PointDto)> {
        self.purge(now);
        let mut visible: Vec<(String, PointDto)> = self
            .cursors
            .iter()
            .map(|(user_id, cursor)| (user_id.clone(), cursor.point))
            .collect();
        visible.sort_by(|a, b| a.0.cmp(&b.0));
        visible
    }

    /// Drop cursors silent for longer than the window; returns how many were dropped.
    pub fn purge(&mut self, now: i64) -> usize {
        let before = self.cursors.len();
        let ttl = self.ttl_millis;
        self.cursors.retain(|_, cursor| now - cursor.last_seen < ttl);
        before - self.cursors.len()
    }

    pub fn clear(&mut self) {
        self.cursors.clear();
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }
}
