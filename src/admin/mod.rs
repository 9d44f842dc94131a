//! Read-only admin API.
//!
//! # Responsibilities
//! - Report rule statistics
//! - Expose the current rule snapshot
//! - Dry-run the matcher for a host and path without logging
//!
//! # Design Decisions
//! - Served on its own listener, bound to loopback by default
//! - Dry runs use the same selection and rewrite code as live traffic

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::rules::InMemoryRuleStore;
use self::handlers::*;

#[derive(Clone)]
pub struct AdminState {
    pub store: Arc<InMemoryRuleStore>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/rules", get(get_rules))
        .route("/admin/match", get(get_match))
        .with_state(state)
}
