// Server loop module
// Accepts connections until shutdown, then drains in-flight connections

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use super::connection::accept_connection;
use super::signal::SignalHandler;
use crate::config::AppState;
use crate::logger;

/// How often the drain loop re-checks the connection counter
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept loop for the edge server
///
/// Returns once a shutdown signal arrives and open connections have
/// finished or `performance.shutdown_timeout` has elapsed.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    signals: Arc<SignalHandler>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Each connection subscribes on accept, so none misses the drain
    let (drain_tx, _) = broadcast::channel::<()>(1);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &state,
                            &active_connections,
                            drain_tx.subscribe(),
                        );
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = signals.shutdown.notified() => break,
        }
    }

    // Stop accepting, then ask open connections to close once idle
    drop(listener);
    let _ = drain_tx.send(());
    let grace = Duration::from_secs(state.config.performance.shutdown_timeout);
    drain_connections(&active_connections, grace).await;
    Ok(())
}

/// Wait until `active` drops to zero or `grace` elapses
///
/// Connections still open at the deadline are cancelled when the caller's
/// `LocalSet` is dropped.
async fn drain_connections(active: &AtomicUsize, grace: Duration) -> usize {
    logger::log_shutdown_started(active.load(Ordering::SeqCst));

    let deadline = tokio::time::Instant::now() + grace;
    let mut remaining = active.load(Ordering::SeqCst);
    while remaining > 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        remaining = active.load(Ordering::SeqCst);
    }

    logger::log_shutdown_complete(remaining);
    remaining
}
