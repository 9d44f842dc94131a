//! Redirect rules subsystem.
//!
//! # Data Flow
//! ```text
//! [[rules]] in config
//!     → config::loader (sanitize, assign ids, validate)
//!     → model.rs (RedirectRule, frozen)
//!     → store.rs (sort by priority desc / id asc, swap in atomically)
//!
//! Per request:
//!     engine → store.list_eligible_rules(now) → filtered, ordered snapshot
//! ```
//!
//! # Design Decisions
//! - Rules are immutable once loaded; reload replaces the whole set
//! - Source type is a tagged variant so dispatch is checked at compile time
//! - Eligibility (kill switch + schedule window) is decided by the store

pub mod model;
pub mod store;

pub use model::{RedirectRule, RedirectStatus, RuleSource, SourceType, TrailingSlashMode};
pub use store::{InMemoryRuleStore, RuleStats, RuleStore, RuleStoreError};
