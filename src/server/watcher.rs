//! File watcher that keeps the authority in sync with its files on disk.

use std::path::{Path, PathBuf};
use std::sync::Weak;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::Category;
use crate::server::ConfigServer;

/// Watches the directories containing the configuration files.
///
/// Directories are watched rather than the files themselves so that
/// replace-by-rename edits keep being observed.
pub struct FileWatcher {
    server: Weak<ConfigServer>,
}

impl FileWatcher {
    pub fn new(server: Weak<ConfigServer>) -> Self {
        Self { server }
    }

    /// Start watching in notify's background thread.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let server = self.server.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    let Some(server) = server.upgrade() else {
                        return;
                    };
                    for category in Category::ALL {
                        if touches(&event, server.path(category)) {
                            match server.reload(category) {
                                Ok(true) => {
                                    tracing::info!(category = %category, "Configuration file changed, reloaded")
                                }
                                Ok(false) => {}
                                Err(e) => tracing::error!(
                                    category = %category,
                                    "Failed to reload configuration file: {}. Keeping current document.",
                                    e
                                ),
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        let Some(server) = self.server.upgrade() else {
            return Ok(watcher);
        };
        for dir in watched_dirs(&server) {
            watcher.watch(&dir, RecursiveMode::NonRecursive)?;
            tracing::info!(path = ?dir, "Config watcher started");
        }
        Ok(watcher)
    }
}

fn watched_dirs(server: &ConfigServer) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for category in Category::ALL {
        let dir = parent_dir(server.path(category));
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn touches(event: &Event, path: &Path) -> bool {
    event
        .paths
        .iter()
        .any(|p| p.file_name().is_some() && p.file_name() == path.file_name())
}
