//! siteconf: hot-reloaded site configuration for every process.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌────────────────────────── server mode ───────────────────────────┐
//!   │ basic/core files ──▶ ConfigServer ──▶ internal API (axum) ───────┼──▶ client-mode
//!   │                          │                                       │    processes
//!   │                     LocalFetcher                                 │
//!   └──────────────────────────┼───────────────────────────────────────┘
//!                              ▼
//!   ┌───────────────────────── every process ──────────────────────────┐
//!   │ refresher ──▶ Fetcher ──▶ ConfigStore (basic, core) ──▶ get()    │
//!   │                               │                                  │
//!   │                               └──▶ watcher registry ──▶ watch()  │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `siteconf [settings.toml]`. The role comes from `CONFIGURATION_MODE`
//! (`server`, `client` or `test`; default `client`).

use std::path::Path;

use tokio::net::TcpListener;

use siteconf::lifecycle;
use siteconf::observability::{logging, metrics};
use siteconf::server::api;
use siteconf::settings::Settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    tracing::info!("siteconf v{} starting", env!("CARGO_PKG_VERSION"));

    let settings = match std::env::args_os().nth(1) {
        Some(path) => Settings::load(Path::new(&path))?,
        None => Settings::default(),
    }
    .with_env()?;

    tracing::info!(
        mode = %settings.mode,
        internal_api = %settings.internal_api,
        "Settings loaded"
    );

    if let Some(addr) = &settings.metrics_address {
        match addr.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %addr, "Failed to parse metrics address"),
        }
    }

    let services = lifecycle::start(&settings)?;
    let client = services.client.clone();
    if siteconf::global::install(client.clone()).is_err() {
        tracing::warn!("Process-wide configuration client was already installed");
    }

    let api_server = match &services.authority {
        Some(authority) => {
            let listener = TcpListener::bind(&settings.bind_address).await?;
            Some(tokio::spawn(api::serve(
                listener,
                authority.clone(),
                client.shutdown_signal(),
            )))
        }
        None => None,
    };

    // Registered in its own task: in client mode the first configuration may
    // not arrive until the authority is reachable.
    tokio::spawn({
        let client = client.clone();
        async move {
            let reader = client.clone();
            client
                .watch(move || {
                    let conf = reader.get();
                    tracing::info!(
                        external_url = ?conf.basic.external_url,
                        auth_providers = conf.basic.auth_providers.len(),
                        update_channel = ?conf.core.update_channel,
                        maintenance_mode = conf.core.maintenance_mode,
                        "Site configuration in effect"
                    );
                })
                .await;
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    let refresher = services.stop().await;
    if let Some(handle) = api_server {
        handle.await??;
    }
    refresher?;

    tracing::info!("Shutdown complete");
    Ok(())
}
