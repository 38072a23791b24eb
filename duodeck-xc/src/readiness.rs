//! Audio-server readiness gate
//!
//! The decks output through a sound server that may start after us. Startup
//! waits (bounded) for its socket to appear, then proceeds regardless.

use std::path::Path;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

/// Wait until `path` exists or `timeout` elapses
///
/// Returns `true` if the socket appeared, `false` if we gave up waiting.
pub async fn wait_for_socket(path: &Path, timeout: Duration, retry: Duration) -> bool {
    if path.exists() {
        return true;
    }

    info!(
        "Audio socket {} not found; waiting up to {:.1}s",
        path.display(),
        timeout.as_secs_f64()
    );
    let deadline = Instant::now() + timeout;
    let retry = retry.max(Duration::from_millis(10));

    while Instant::now() < deadline {
        sleep(retry.min(deadline.saturating_duration_since(Instant::now()))).await;
        if path.exists() {
            info!("Audio socket {} is ready", path.display());
            return true;
        }
    }

    warn!("Audio socket {} still missing; continuing anyway", path.display());
    false
}
