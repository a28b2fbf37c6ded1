/// Completes on the first SIGINT, SIGTERM or SIGHUP.
#[cfg(unix)]
pub async fn wait_for_signal() -> anyhow::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    let name = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            "SIGINT"
        }
        _ = sigterm.recv() => "SIGTERM",
        _ = sighup.recv() => "SIGHUP",
    };

    tracing::info!("Received {}, exiting.", name);
    Ok(())
}

#[cfg(not(unix))]
pub async fn wait_for_signal() -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Received Ctrl-C, exiting.");
    Ok(())
}
