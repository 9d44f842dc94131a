//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path with query)
//!     → selector.rs (scan eligible rules in order)
//!     → matcher.rs (domain or path pattern, per rule source type)
//!     → Return: first matching rule or none
//! ```
//!
//! # Design Decisions
//! - Ordering is the rule store's job; the selector trusts it
//! - No regex in hot path (exact, suffix and prefix comparisons only)
//! - Deterministic: same snapshot and request always select the same rule
//! - First match wins (ordered by priority)

pub mod matcher;
pub mod selector;

pub use matcher::{matches_domain, matches_path};
pub use selector::select;
