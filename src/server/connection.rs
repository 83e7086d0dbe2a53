// Connection handling module
// Accepts single TCP connections and serves them with the SPA handler

use http_body_util::Full;
use hyper::body::{Body, Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, Version};
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::server_loop::ServerSettings;
use crate::fs::FileSystem;
use crate::logger::{self, AccessLogEntry};
use crate::spa::SpaHandler;

/// Accept and process a connection, checking limits.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `handler` - Shared SPA handler
/// * `settings` - Connection settings
/// * `conn_counter` - Active connection counter
/// * `graceful` - Shutdown watcher the connection registers with
pub fn accept_connection<F: FileSystem + 'static>(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    handler: &Arc<SpaHandler<F>>,
    settings: &Arc<ServerSettings>,
    conn_counter: &Arc<AtomicUsize>,
    graceful: &GracefulShutdown,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = settings.max_connections {
        if prev_count >= max_conn {
            // Exceeded limit: rollback counter and reject
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            warn!("Max connections reached: {prev_count}/{max_conn}. Connection rejected.");
            drop(stream);
            return;
        }
    }

    debug!("Accepted connection from {peer_addr}");

    handle_connection(
        stream,
        peer_addr,
        Arc::clone(handler),
        Arc::clone(settings),
        Arc::clone(conn_counter),
        graceful,
    );
}

/// Handle a single connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures HTTP/1.1 keep-alive
/// 3. Serves the connection with the SPA handler
/// 4. Registers it for graceful shutdown
/// 5. Applies timeout to the connection
/// 6. Decrements connection counter when done
fn handle_connection<F: FileSystem + 'static>(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    handler: Arc<SpaHandler<F>>,
    settings: Arc<ServerSettings>,
    conn_counter: Arc<AtomicUsize>,
    graceful: &GracefulShutdown,
) {
    let io = TokioIo::new(stream);
    let timeout_duration = settings.connection_timeout;

    let mut builder = http1::Builder::new();
    builder.keep_alive(settings.keep_alive);

    let conn = builder.serve_connection(
        io,
        service_fn(move |req| {
            let handler = Arc::clone(&handler);
            let settings = Arc::clone(&settings);
            async move {
                Ok::<_, Infallible>(serve_request(&handler, req, peer_addr, &settings).await)
            }
        }),
    );
    let conn = graceful.watch(conn);

    tokio::spawn(async move {
        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => debug!("Failed to serve connection: {err:?}"),
            Err(_) => {
                warn!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                );
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Serve one request and write its access log line
async fn serve_request<F: FileSystem>(
    handler: &SpaHandler<F>,
    req: Request<Incoming>,
    peer_addr: SocketAddr,
    settings: &ServerSettings,
) -> Response<Full<Bytes>> {
    let start = Instant::now();
    let entry = settings.access_log.then(|| {
        let mut entry = AccessLogEntry::new(
            logger::client_addr(req.headers(), &peer_addr),
            req.method().to_string(),
            req.uri().path().to_string(),
        )
        .with_headers(req.headers());
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = http_version(req.version()).to_string();
        entry
    });

    let resp = match handler.handle(req).await {
        Ok(resp) => resp,
        Err(never) => match never {},
    };

    if let Some(mut entry) = entry {
        entry.status = resp.status().as_u16();
        entry.body_bytes = resp
            .body()
            .size_hint()
            .exact()
            .map_or(0, |n| usize::try_from(n).unwrap_or(usize::MAX));
        entry.request_time_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &settings.access_log_format);
    }
    resp
}

fn http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_version() {
        assert_eq!(http_version(Version::HTTP_10), "1.0");
        assert_eq!(http_version(Version::HTTP_11), "1.1");
        assert_eq!(http_version(Version::HTTP_2), "2");
    }
}
