// Connection handling module
// Serves one TCP connection and hosts the dispatcher for each request on it

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

use crate::config::AppState;
use crate::dispatch;
use crate::error::{AssetError, BoxError, DispatchError};
use crate::http;
use crate::logger;

/// Accept a connection, enforcing the connection limit.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
/// * `drain` - Fires when the server stops accepting
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
    drain: broadcast::Receiver<()>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    if state.config.logging.access_log {
        logger::log_connection_accepted(&peer_addr);
    }

    handle_connection(
        stream,
        peer_addr,
        Arc::clone(state),
        Arc::clone(conn_counter),
        drain,
    );
}

/// Serve a connection in a spawned local task.
///
/// The whole connection, keep-alive included, is bounded by
/// `max(read_timeout, write_timeout)`. On drain the connection finishes its
/// in-flight request and closes instead of waiting for the next one. The
/// counter is decremented when the task ends.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
    mut drain: broadcast::Receiver<()>,
) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let timeout_duration = Duration::from_secs(std::cmp::max(
            performance.read_timeout,
            performance.write_timeout,
        ));

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive_timeout > 0);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&service_state);
                async move { Ok::<_, Infallible>(handle_request(req, &state, peer_addr).await) }
            }),
        );

        tokio::pin!(conn);
        let serve = async {
            tokio::select! {
                result = conn.as_mut() => result,
                _ = drain.recv() => {
                    conn.as_mut().graceful_shutdown();
                    conn.await
                }
            }
        };

        match tokio::time::timeout(timeout_duration, serve).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} closed after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Run one request through the dispatcher and write its access log line
pub async fn handle_request<B>(
    req: Request<B>,
    state: &AppState,
    peer_addr: SocketAddr,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let logging = &state.config.logging;
    let mut entry = logging
        .access_log
        .then(|| logger::AccessLogEntry::from_request(peer_addr, &req));
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = match dispatch::dispatch(req, &state.env).await {
        Ok(resp) => resp,
        Err(err) => {
            logger::log_dispatch_error(method.as_str(), &path, &err);
            error_response(&err)
        }
    };

    if let Some(entry) = entry.as_mut() {
        let body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.finish(response.status().as_u16(), body_bytes, started.elapsed());
        logger::log_access(entry, &logging.access_log_format);
    }
    response
}

/// Status the edge runtime answers with when dispatch fails
fn error_response(err: &DispatchError) -> Response<Full<Bytes>> {
    match err {
        DispatchError::MalformedUrl(_) => http::build_400_response(),
        DispatchError::Asset(AssetError::Timeout(_)) => http::build_504_response(),
        DispatchError::Asset(_) => http::build_502_response(),
    }
}
