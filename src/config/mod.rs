//! Site configuration documents and their validating stores.
//!
//! # Data Flow
//! ```text
//! raw document (JSON with comments)
//!     → jsonc.rs (normalize to strict JSON)
//!     → schema.rs (deserialize into the category's type)
//!     → validation.rs (semantic checks)
//!     → store.rs (compare with last valid, swap Arc on change)
//!     → readers load the Arc without locking
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable once accepted; changes replace the whole value
//! - All fields have defaults so an empty document is valid
//! - Change detection compares parsed values, not raw text

pub mod jsonc;
pub mod schema;
pub mod store;
pub mod validation;

pub use schema::{BasicSiteConfiguration, Category, CoreSiteConfiguration};
pub use store::{ConfigChange, ConfigStore, StoreError};
pub use validation::{Validate, ValidationError};
