//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Refresher, stores, watcher registry, authority:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (refresh outcome counters, watcher gauge)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Prometheus scrape (optional exporter)
//! ```

pub mod logging;
pub mod metrics;
