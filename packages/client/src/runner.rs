//! Reconnecting driver around a single client session.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::{
    domain::{ReconnectPolicy, is_fatal},
    error::ClientError,
    session::{ClientState, SessionConfig, run_client_session},
    ui::spawn_input_reader,
};

/// Run the client, reconnecting on transient failures.
///
/// 入力リーダーはプロセスで一つだけ起動し、再接続をまたいで使い回します。
/// キャンバスの状態も保持し、再接続後の init-state で置き換えます。
pub async fn run_client(config: SessionConfig) -> Result<(), ClientError> {
    let policy = ReconnectPolicy::default();
    let state = Arc::new(Mutex::new(ClientState::new()));
    let mut input = spawn_input_reader(format!("{}> ", config.user_id));
    let mut failures = 0;

    loop {
        tracing::info!(
            "Connecting to {} room '{}' as '{}' (attempt {}/{})",
            config.url,
            config.room,
            config.user_id,
            failures + 1,
            policy.max_attempts
        );

        let error = match run_client_session(&config, &state, &mut input).await {
            Ok(()) => {
                tracing::info!("Client session ended");
                return Ok(());
            }
            Err(e) => e,
        };

        if is_fatal(&error) {
            tracing::error!("{}. Exiting.", error);
            return Err(error);
        }

        tracing::warn!("Connection lost: {}", error);
        failures += 1;

        if !policy.allows(&error, failures) {
            tracing::error!("Gave up after {} attempts", policy.max_attempts);
            return Err(error);
        }

        tracing::info!(
            "Reconnecting in {}s (attempt {}/{})",
            policy.interval.as_secs(),
            failures + 1,
            policy.max_attempts
        );
        tokio::time::sleep(policy.interval).await;
    }
}
