//! Redirect engine subsystem.
//!
//! # Data Flow
//! ```text
//! Received (InboundRequest)
//!     → Matching: store.list_eligible_rules(now) → routing::select
//!     → Matched: rewrite::build_destination
//!         → Logging: access_log sink (spawned, failures swallowed)
//!         → Redirecting: Outcome::Redirect(decision)
//!     → Unmatched: Outcome::PassThrough (next handler runs)
//! ```
//!
//! # Design Decisions
//! - The engine is the only component the HTTP layer talks to
//! - Matching is synchronous over an in-memory snapshot

pub mod redirect;
pub mod request;

pub use redirect::{evaluate, Outcome, RedirectDecision, RedirectEngine};
pub use request::InboundRequest;
