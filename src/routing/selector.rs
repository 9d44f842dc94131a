//! Rule selection.
//!
//! # Responsibilities
//! - Scan eligible rules in the order the store returned them
//! - Dispatch each rule to the matcher for its source type
//! - Return the first rule that matches, or nothing
//!
//! # Design Decisions
//! - First match wins: a lower-priority exact match never overrides a
//!   higher-priority wildcard
//! - Domain and URL rules share one ordering and one pass

use std::sync::Arc;

use crate::routing::matcher::{matches_domain, matches_path};
use crate::rules::model::{RedirectRule, RuleSource};

/// Whether a single rule matches the request host and path.
pub fn rule_matches(rule: &RedirectRule, request_host: &str, request_path: &str) -> bool {
    match &rule.source {
        RuleSource::Domain(pattern) => matches_domain(request_host, pattern, rule.case_sensitive),
        RuleSource::Url(pattern) => matches_path(request_path, pattern, rule.case_sensitive),
    }
}

/// Return the first rule in `eligible_rules` that matches.
///
/// `eligible_rules` must already be ordered by priority descending, id
/// ascending.
pub fn select<'a>(
    eligible_rules: &'a [Arc<RedirectRule>],
    request_host: &str,
    request_path: &str,
) -> Option<&'a Arc<RedirectRule>> {
    eligible_rules
        .iter()
        .find(|rule| rule_matches(rule, request_host, request_path))
}
