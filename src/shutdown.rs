//! Stop requests from the terminal or a process supervisor.
//!
//! The first SIGINT, SIGTERM or SIGHUP cancels the run's token: the file
//! being uploaded is finished and attached, later files are skipped. Any
//! further signal exits immediately with status 130.

use tokio_util::sync::CancellationToken;

#[cfg(unix)]
struct Signals {
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    async fn next(&mut self) -> std::io::Result<()> {
        tokio::select! {
            r = tokio::signal::ctrl_c() => r,
            _ = self.terminate.recv() => Ok(()),
            _ = self.hangup.recv() => Ok(()),
        }
    }
}

#[cfg(not(unix))]
struct Signals;

#[cfg(not(unix))]
impl Signals {
    fn register() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn next(&mut self) -> std::io::Result<()> {
        tokio::signal::ctrl_c().await
    }
}

/// Register the handlers and hand back the token they cancel.
///
/// Registration errors surface here rather than inside the spawned task.
/// Must be called from within a Tokio runtime.
pub(crate) fn install_signal_handler() -> anyhow::Result<CancellationToken> {
    let mut signals = Signals::register()?;
    let token = CancellationToken::new();
    let on_signal = token.clone();

    tokio::spawn(async move {
        let mut received = 0u32;
        loop {
            if let Err(e) = signals.next().await {
                tracing::warn!("Stopped listening for shutdown signals: {}", e);
                return;
            }
            received += 1;
            if received > 1 {
                tracing::warn!("Second shutdown signal, exiting now");
                std::process::exit(130);
            }
            tracing::info!("Shutdown requested; finishing the current file (signal again to abort)");
            on_signal.cancel();
        }
    });

    Ok(token)
}
