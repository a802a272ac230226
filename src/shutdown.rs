use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

/// Install a handler that cancels the returned token on SIGTERM or SIGINT.
///
/// The simulation treats cancellation as the end of an external interruption
/// and answers it with an `INTERRUPTION_SUCCESS` event; it never aborts a
/// processor call that is already running.
pub fn install_shutdown_handler() -> std::io::Result<CancellationToken> {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, interrupting job");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, interrupting job");
            }
        }

        token_clone.cancel();
    });

    Ok(token)
}
