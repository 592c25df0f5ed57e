//! OS signal handling.
//!
//! SIGINT and SIGTERM both request a graceful shutdown: listeners finish
//! the session in progress and stop at the next loop boundary.

/// Wait until the process receives SIGINT or SIGTERM.
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate =
        signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.expect("Failed to install Ctrl+C handler");
            tracing::info!("SIGINT received, shutting down");
        }
        _ = terminate.recv() => {
            tracing::info!("SIGTERM received, shutting down");
        }
    }
}

/// Wait until the process receives Ctrl+C.
#[cfg(not(unix))]
pub async fn wait_for_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("shutdown signal received");
}
