// Server loop module
// Accepts connections until shutdown, then waits for in-flight connections

use hyper_util::server::graceful::GracefulShutdown;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use super::connection::accept_connection;
use crate::config::Config;
use crate::fs::FileSystem;
use crate::spa::SpaHandler;

/// Connection settings derived from configuration
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub keep_alive: bool,
    /// Upper bound on the lifetime of one connection
    pub connection_timeout: Duration,
    pub max_connections: Option<usize>,
    pub access_log: bool,
    pub access_log_format: String,
}

impl ServerSettings {
    pub fn from_config(config: &Config) -> Self {
        let perf = &config.performance;
        Self {
            keep_alive: perf.keep_alive,
            connection_timeout: Duration::from_secs(perf.read_timeout.max(perf.write_timeout)),
            max_connections: perf
                .max_connections
                .map(|max| usize::try_from(max).unwrap_or(usize::MAX)),
            access_log: config.logging.access_log,
            access_log_format: config.logging.access_log_format.clone(),
        }
    }
}

/// Serve the SPA handler on `listener` until `shutdown` resolves
///
/// After shutdown no new connections are accepted. Idle keep-alive connections
/// are closed right away, busy ones finish their current request. All of them
/// get up to `connection_timeout` to do so.
pub async fn serve<F, S>(
    listener: TcpListener,
    handler: Arc<SpaHandler<F>>,
    settings: Arc<ServerSettings>,
    shutdown: S,
) -> std::io::Result<()>
where
    F: FileSystem + 'static,
    S: Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &handler,
                            &settings,
                            &active_connections,
                            &graceful,
                        );
                    }
                    Err(e) => error!("Failed to accept connection: {e}"),
                }
            }

            () = &mut shutdown => {
                info!("Shutdown requested, no longer accepting connections");
                break;
            }
        }
    }

    drop(listener);
    match tokio::time::timeout(settings.connection_timeout, graceful.shutdown()).await {
        Ok(()) => info!("All connections closed"),
        Err(_) => warn!(
            "Shutting down with {} connection(s) still open",
            active_connections.load(Ordering::SeqCst)
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let mut cfg = Config::load_from("definitely-missing-config-file").unwrap();
        cfg.performance.read_timeout = 10;
        cfg.performance.write_timeout = 45;
        cfg.performance.max_connections = Some(64);
        let settings = ServerSettings::from_config(&cfg);
        assert_eq!(settings.connection_timeout, Duration::from_secs(45));
        assert_eq!(settings.max_connections, Some(64));
        assert!(settings.keep_alive);
        assert_eq!(settings.access_log_format, "combined");
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        use crate::fs::MemoryFs;

        let fs = MemoryFs::builder()
            .file("index.html", "test index")
            .build()
            .unwrap();
        let handler = Arc::new(SpaHandler::new(fs, ".", "/").await.unwrap());
        let listener = crate::server::create_reusable_listener("127.0.0.1:0".parse().unwrap())
            .unwrap();
        let settings = Arc::new(ServerSettings::from_config(
            &Config::load_from("definitely-missing-config-file").unwrap(),
        ));

        tokio::time::timeout(
            Duration::from_secs(5),
            serve(listener, handler, settings, std::future::ready(())),
        )
        .await
        .unwrap()
        .unwrap();
    }
}
