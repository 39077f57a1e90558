//! Binary entry point. Loads configuration, starts the Tree Monitor via
//! `Supervisor::new`, and serves the HTTP API until SIGINT/SIGTERM, at which
//! point every remaining node is terminated before the process exits
//! (spec §9 supplemented shutdown hook). Grounded on the teacher's
//! `dusa_collection_utils` logger initialization and the enrichment repo's
//! `tokio::runtime::Builder::new_multi_thread` entry point
//! (`remotemedia-http-server/src/main.rs`).

use dusa_collection_utils::core::logger::{set_log_level, LogLevel};
use dusa_collection_utils::log;
use node_supervisor::config::AppConfig;
use node_supervisor::http;
use node_supervisor::supervisor::Supervisor;
use std::sync::Arc;

fn main() -> std::io::Result<()> {
    set_log_level(LogLevel::Info);

    let config = match AppConfig::new() {
        Ok(config) => config,
        Err(e) => {
            log!(LogLevel::Error, "Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        log!(LogLevel::Error, "Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("node-supervisor")
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        log!(LogLevel::Info, "Starting node supervisor on {}", config.bind_address);

        let bind_address = config.bind_address.clone();
        let supervisor = Arc::new(Supervisor::new(config));

        let shutdown_supervisor = supervisor.clone();
        let result = http::serve(&bind_address, supervisor, async move {
            shutdown_signal().await;
            log!(LogLevel::Info, "Shutdown signal received, terminating all nodes");
            shutdown_supervisor.shutdown().await;
        })
        .await;

        if let Err(e) = result {
            log!(LogLevel::Error, "HTTP server error: {}", e);
        }
    });

    log!(LogLevel::Info, "node supervisor shut down");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
    }
}
