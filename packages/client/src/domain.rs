//! Pure client-side decisions: reconnect policy and user id generation.

use std::time::Duration;

use rand::Rng;

use crate::error::ClientError;

const USER_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const USER_ID_SUFFIX_LENGTH: usize = 6;

/// Returns true for errors that a retry cannot fix.
///
/// 不正な room id と満員の room は何度つないでも同じ結果になります。
pub fn is_fatal(error: &ClientError) -> bool {
    matches!(
        error,
        ClientError::InvalidRoom(_) | ClientError::RoomFull(_)
    )
}

/// 再接続の上限回数と待ち時間
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            interval: Duration::from_secs(5),
        }
    }
}

impl ReconnectPolicy {
    /// Whether attempt number `failures` (1 after the first failure) may reconnect.
    pub fn allows(&self, error: &ClientError, failures: u32) -> bool {
        !is_fatal(error) && failures < self.max_attempts
    }
}

/// Random `u-xxxxxx` user id (lowercase base36).
pub fn generate_user_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..USER_ID_SUFFIX_LENGTH)
        .map(|_| USER_ID_ALPHABET[rng.random_range(0..USER_ID_ALPHABET.len())] as char)
        .collect();
    format!("u-{}", suffix)
}
