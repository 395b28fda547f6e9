use amora_shared::types::{Outbound, UserId};

use crate::AppState;

/// Fire-and-forget delivery to another user. Runs on its own task with a
/// fixed deadline so an unreachable recipient never stalls the acting
/// user's flow; failure and timeout are logged, never surfaced.
pub fn notify(state: &AppState, target: UserId, message: Outbound) {
    let transport = state.transport.clone();
    let deadline = state.config.notify_timeout();

    tokio::spawn(async move {
        match tokio::time::timeout(deadline, transport.send(target, &message)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(target_id = target, error = %e, "notification delivery failed");
            }
            Err(_) => {
                tracing::warn!(target_id = target, "notification timed out");
            }
        }
    });
}
