//! SIGUSR1 skip requests
//!
//! Kept alongside the HTTP control API for the button handler's
//! service-signal transport (`systemctl kill -s USR1 <unit>`).

use crate::skip::SkipSignal;
use tracing::{error, info};

/// Forward every SIGUSR1 to `skip` until the task is dropped
#[cfg(unix)]
pub async fn forward_skip_signals(skip: SkipSignal) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut usr1 = match signal(SignalKind::user_defined1()) {
        Ok(stream) => stream,
        Err(e) => {
            error!("Failed to install SIGUSR1 handler: {}", e);
            return;
        }
    };

    while usr1.recv().await.is_some() {
        let pending = skip.request();
        info!("Received SIGUSR1; skip requested ({} pending)", pending);
    }
}

#[cfg(not(unix))]
pub async fn forward_skip_signals(_skip: SkipSignal) {
    tracing::warn!("SIGUSR1 skip requests are not supported on this platform");
}
