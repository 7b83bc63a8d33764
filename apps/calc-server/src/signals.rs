use tokio::signal;

/// Resolve when the process is asked to stop (Ctrl+C or SIGTERM).
pub async fn shutdown_signal() {
    let name = tokio::select! {
        name = ctrl_c() => name,
        name = sigterm() => name,
    };
    tracing::info!(signal = name, "shutdown signal received, draining connections");
}

async fn ctrl_c() -> &'static str {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    "SIGINT"
}

#[cfg(unix)]
async fn sigterm() -> &'static str {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut handler) => {
            handler.recv().await;
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to install SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
    "SIGTERM"
}

#[cfg(not(unix))]
async fn sigterm() -> &'static str {
    std::future::pending().await
}
