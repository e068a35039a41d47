//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use siteconf::fetch::{Fetcher, FixedFetcher};
use siteconf::lifecycle::Shutdown;
use siteconf::server::{api, ConfigServer};
use siteconf::Client;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A client reading from shared in-memory documents.
pub fn fixed_client(basic: &str, core: &str) -> (Arc<Client>, FixedFetcher) {
    let fixed = FixedFetcher::new(basic, core);
    let client = Client::new(Fetcher::from(fixed.clone()), Fetcher::from(fixed.clone()))
        .with_refresh_jitter(Duration::from_millis(10));
    (Arc::new(client), fixed)
}

/// Register a watcher that reports the value `read` extracts on every call.
pub async fn watch_values<T, F>(client: &Arc<Client>, read: F) -> mpsc::UnboundedReceiver<T>
where
    T: Send + 'static,
    F: Fn(&Client) -> T + Send + Sync + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let reader = client.clone();
    client
        .watch(move || {
            let _ = tx.send(read(&*reader));
        })
        .await;
    rx
}

/// Receive the next value or give up after `ms` milliseconds.
pub async fn recv_within<T>(rx: &mut mpsc::UnboundedReceiver<T>, ms: u64) -> Option<T> {
    tokio::time::timeout(Duration::from_millis(ms), rx.recv())
        .await
        .ok()
        .flatten()
}

/// Poll `check` until it holds or `ms` milliseconds pass.
pub async fn eventually<F, Fut>(ms: u64, check: F) -> bool
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_millis(ms);
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check().await
}

/// Start an authority over files in `dir` and serve its internal API on an
/// ephemeral port.
pub async fn start_authority(dir: &Path) -> (Arc<ConfigServer>, SocketAddr, Shutdown) {
    let server = Arc::new(ConfigServer::new(dir.join("basic.json"), dir.join("core.json")));
    server.start().unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    tokio::spawn(api::serve(listener, server.clone(), shutdown.subscribe()));
    (server, addr, shutdown)
}
