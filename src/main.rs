use spa_server::config::{Config, DEFAULT_CONFIG_PATH};
use spa_server::fs::DiskFs;
use spa_server::server::{self, signal, ServerSettings};
use spa_server::{logger, SpaHandler};
use std::sync::Arc;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;

    // Must stay alive until exit so buffered log lines are flushed
    let _log_guard = logger::init(&cfg.logging)?;

    // Create the Tokio runtime, sizing the worker pool from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        info!("Using {workers} worker threads");
    } else {
        info!("Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;

    let handler = SpaHandler::new(
        DiskFs::new(&cfg.spa.root),
        &cfg.spa.sub_dir,
        &cfg.spa.mount_prefix,
    )
    .await?;

    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    server::serve(
        listener,
        Arc::new(handler),
        Arc::new(ServerSettings::from_config(&cfg)),
        signal::shutdown_signal(),
    )
    .await?;

    info!("Server stopped");
    Ok(())
}
