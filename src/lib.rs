//! Redirect proxy library.
//!
//! Matches inbound requests against operator-defined redirect rules and
//! answers the first match with a redirect. Unmatched requests fall through.

pub mod access_log;
pub mod admin;
pub mod config;
pub mod engine;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;
pub mod routing;
pub mod rules;

pub use config::schema::RedirectConfig;
pub use engine::{Outcome, RedirectEngine};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
