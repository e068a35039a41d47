//! Authoritative configuration server.
//!
//! # Data Flow
//! ```text
//! basic/core files on disk
//!     → ConfigServer (raw text held in ArcSwap)
//!     → watcher.rs reloads on file modify/create
//!     → api.rs serves raw documents to client-role processes
//!     → LocalFetcher reads directly inside the authority process
//! ```
//!
//! # Design Decisions
//! - The server owns the canonical copy and all writes
//! - It serves raw text; validation happens in each consumer's store
//! - Writes go through a temp file and rename so readers never see a torn file

pub mod api;
pub mod watcher;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use notify::RecommendedWatcher;
use thiserror::Error;

use crate::config::Category;

const EMPTY_DOCUMENT: &str = "{}\n";

/// Errors raised by the authoritative server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to watch configuration files: {0}")]
    Watch(#[from] notify::Error),
}

impl ServerError {
    fn io(path: &Path, source: io::Error) -> Self {
        ServerError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// File-backed owner of the canonical configuration documents.
pub struct ConfigServer {
    basic_path: PathBuf,
    core_path: PathBuf,
    basic: ArcSwap<String>,
    core: ArcSwap<String>,
    serving: AtomicBool,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl ConfigServer {
    /// Create a server for the given files. Nothing is read until [`start`](Self::start).
    pub fn new(basic_path: impl Into<PathBuf>, core_path: impl Into<PathBuf>) -> Self {
        Self {
            basic_path: basic_path.into(),
            core_path: core_path.into(),
            basic: ArcSwap::from_pointee(String::new()),
            core: ArcSwap::from_pointee(String::new()),
            serving: AtomicBool::new(false),
            watcher: Mutex::new(None),
        }
    }

    /// Load both documents (creating missing files) and begin watching them.
    pub fn start(self: &Arc<Self>) -> Result<(), ServerError> {
        for category in Category::ALL {
            let path = self.path(category);
            if !path.exists() {
                tracing::info!(category = %category, path = ?path, "Creating empty configuration file");
                fs::write(path, EMPTY_DOCUMENT).map_err(|e| ServerError::io(path, e))?;
            }
            self.reload(category)?;
        }

        let watcher = watcher::FileWatcher::new(Arc::downgrade(self)).run()?;
        *self.watcher.lock().unwrap_or_else(PoisonError::into_inner) = Some(watcher);

        self.serving.store(true, Ordering::Release);
        tracing::info!(
            basic = ?self.basic_path,
            core = ?self.core_path,
            "Configuration server started"
        );
        Ok(())
    }

    /// Whether [`start`](Self::start) has completed.
    pub fn is_serving(&self) -> bool {
        self.serving.load(Ordering::Acquire)
    }

    pub fn raw_basic(&self) -> String {
        self.raw(Category::Basic)
    }

    pub fn raw_core(&self) -> String {
        self.raw(Category::Core)
    }

    pub fn raw(&self, category: Category) -> String {
        (**self.slot(category).load()).clone()
    }

    pub fn path(&self, category: Category) -> &Path {
        match category {
            Category::Basic => &self.basic_path,
            Category::Core => &self.core_path,
        }
    }

    /// Re-read a document from disk. Returns whether the text changed.
    pub fn reload(&self, category: Category) -> Result<bool, ServerError> {
        let path = self.path(category);
        let contents = fs::read_to_string(path).map_err(|e| ServerError::io(path, e))?;
        Ok(self.replace(category, contents))
    }

    /// Replace a document on disk and in memory.
    pub fn write(&self, category: Category, raw: &str) -> Result<(), ServerError> {
        let path = self.path(category);
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, raw).map_err(|e| ServerError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| ServerError::io(path, e))?;

        if self.replace(category, raw.to_string()) {
            tracing::info!(category = %category, "Configuration document written");
        }
        Ok(())
    }

    fn replace(&self, category: Category, contents: String) -> bool {
        let slot = self.slot(category);
        if **slot.load() == contents {
            return false;
        }
        slot.store(Arc::new(contents));
        true
    }

    fn slot(&self, category: Category) -> &ArcSwap<String> {
        match category {
            Category::Basic => &self.basic,
            Category::Core => &self.core,
        }
    }
}
