//! Site configuration distribution.
//!
//! Keeps a validated, hot-reloaded copy of the site configuration in every
//! process and notifies subscribers when it changes.

pub mod client;
pub mod config;
pub mod fetch;
pub mod global;
pub mod lifecycle;
pub mod observability;
pub mod server;
pub mod settings;

pub use client::{Client, SiteConfiguration};
pub use config::{BasicSiteConfiguration, Category, CoreSiteConfiguration};
pub use settings::{Mode, Settings};
