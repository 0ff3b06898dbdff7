// Signal handling module
//
// SIGTERM and SIGINT (Ctrl+C) stop the accept loop. Windows only has Ctrl+C.

use super::ShutdownHandle;
use std::future::Future;

/// Spawn a task that shuts the server down on the first termination signal
pub fn stop_on_signal(handle: ShutdownHandle) {
    tokio::spawn(async move {
        wait_for_signal().await;
        crate::logger::log_warning("Termination signal received, shutting down");
        handle.shutdown();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let Ok(mut sigterm) = signal(SignalKind::terminate()) else {
        crate::logger::log_warning("Failed to register SIGTERM handler, only Ctrl+C stops the server");
        until_delivered(tokio::signal::ctrl_c()).await;
        return;
    };

    tokio::select! {
        _ = sigterm.recv() => {}
        _ = until_delivered(tokio::signal::ctrl_c()) => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    until_delivered(tokio::signal::ctrl_c()).await;
}

/// Resolve only when the signal actually arrives
///
/// A listener that fails to register never resolves.
async fn until_delivered(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        crate::logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_failed_registration_never_fires() {
        let failed = until_delivered(async { Err(std::io::Error::other("no handler")) });
        let waited = tokio::time::timeout(Duration::from_millis(50), failed).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_delivered_signal_fires() {
        let delivered = until_delivered(async { Ok(()) });
        let waited = tokio::time::timeout(Duration::from_millis(50), delivered).await;
        assert!(waited.is_ok());
    }
}
