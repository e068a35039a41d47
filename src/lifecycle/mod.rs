//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Settings → [server: start authority] → fetchers → client → refresher
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → trigger → refresher, watcher tasks and internal API exit
//! ```

pub mod shutdown;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{start, Services, StartupError};
