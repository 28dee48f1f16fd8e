//! Per-room serialization of intent processing.
//!
//! Room ごとに 1 つのロックを持ち、「ログへの適用 → ブロードキャストのキュー投入」を
//! ひとまとまりで実行します。これによりブロードキャスト順が適用順と一致します。

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::RoomId;

#[derive(Debug, Default)]
pub struct RoomSequencer {
    locks: Mutex<HashMap<RoomId, Arc<Mutex<()>>>>,
}

impl RoomSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the room. Access is released when the guard drops.
    pub async fn acquire(&self, room_id: &RoomId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(room_id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }
}
