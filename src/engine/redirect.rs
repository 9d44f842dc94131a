//! Redirect engine.
//!
//! # Responsibilities
//! - Fetch the eligible rule snapshot once per request
//! - Select the winning rule and build its destination
//! - Hand the access log record to the sink without waiting on it
//!
//! # Design Decisions
//! - Fail open: a rule store error is treated as "no eligible rules"
//! - Access log failures are reported to tracing and metrics only; they
//!   never change the outcome
//! - No shared mutable state is written while matching

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::access_log::{AccessLogRecord, AccessLogSink};
use crate::engine::request::InboundRequest;
use crate::observability::metrics;
use crate::rewrite::build_destination;
use crate::routing::select;
use crate::rules::model::{RedirectRule, RedirectStatus, SourceType};
use crate::rules::store::RuleStore;

/// A redirect the engine decided to serve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectDecision {
    pub rule_id: u64,
    pub source_type: SourceType,
    pub status: RedirectStatus,
    pub location: String,
}

/// Result of running a request through the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Answer with a redirect.
    Redirect(RedirectDecision),
    /// Hand the request to the next handler.
    PassThrough,
}

impl Outcome {
    pub fn decision(&self) -> Option<&RedirectDecision> {
        match self {
            Outcome::Redirect(decision) => Some(decision),
            Outcome::PassThrough => None,
        }
    }
}

/// Select a rule and build its destination without any side effects.
pub fn evaluate(eligible_rules: &[Arc<RedirectRule>], request: &InboundRequest) -> Outcome {
    match select(eligible_rules, &request.host, &request.path_with_query) {
        Some(rule) => Outcome::Redirect(RedirectDecision {
            rule_id: rule.id,
            source_type: rule.source_type(),
            status: rule.status,
            location: build_destination(request, rule),
        }),
        None => Outcome::PassThrough,
    }
}

/// Orchestrates rule store, selector, destination builder and access log.
///
/// Access log writes run as detached tasks and are not awaited on shutdown.
/// Records still in flight when the runtime stops are lost.
#[derive(Clone)]
pub struct RedirectEngine {
    store: Arc<dyn RuleStore>,
    access_log: Arc<dyn AccessLogSink>,
}

impl RedirectEngine {
    pub fn new(store: Arc<dyn RuleStore>, access_log: Arc<dyn AccessLogSink>) -> Self {
        Self { store, access_log }
    }

    /// Decide what to do with `request` at the current time.
    pub async fn handle(&self, request: &InboundRequest) -> Outcome {
        self.handle_at(request, Utc::now()).await
    }

    /// Decide what to do with `request` as of `now`.
    pub async fn handle_at(&self, request: &InboundRequest, now: DateTime<Utc>) -> Outcome {
        let rules = self.eligible_rules(now).await;
        let outcome = evaluate(&rules, request);

        match &outcome {
            Outcome::Redirect(decision) => {
                tracing::info!(
                    rule_id = decision.rule_id,
                    status = decision.status.as_u16(),
                    host = %request.host,
                    path = %request.path_with_query,
                    location = %decision.location,
                    "Redirect matched"
                );
                metrics::record_redirect(decision.status.as_u16(), decision.source_type);
                self.log_access(request, decision, now);
            }
            Outcome::PassThrough => {
                tracing::debug!(
                    host = %request.host,
                    path = %request.path_with_query,
                    rules = rules.len(),
                    "No redirect matched"
                );
                metrics::record_passthrough();
            }
        }

        outcome
    }

    /// Eligible rules at `now`, or none when the store fails.
    pub async fn eligible_rules(&self, now: DateTime<Utc>) -> Vec<Arc<RedirectRule>> {
        match self.store.list_eligible_rules(now).await {
            Ok(rules) => rules,
            Err(e) => {
                tracing::error!(error = %e, "Rule store query failed, passing request through");
                metrics::record_rule_store_failure();
                Vec::new()
            }
        }
    }

    fn log_access(&self, request: &InboundRequest, decision: &RedirectDecision, now: DateTime<Utc>) {
        let record = AccessLogRecord::new(
            request,
            decision.rule_id,
            &decision.location,
            decision.status.as_u16(),
            now,
        );
        let sink = Arc::clone(&self.access_log);

        tokio::spawn(async move {
            if let Err(e) = sink.record(record).await {
                tracing::error!(error = %e, "Failed to log redirect");
                metrics::record_access_log_failure();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_log::{AccessLogError, MemoryAccessLog};
    use crate::rules::store::{InMemoryRuleStore, RuleStoreError};
    use async_trait::async_trait;
    use chrono::Duration;
    use std::time::Duration as StdDuration;

    struct FailingSink;

    #[async_trait]
    impl AccessLogSink for FailingSink {
        async fn record(&self, _record: AccessLogRecord) -> Result<(), AccessLogError> {
            Err(AccessLogError::Unavailable("disk full".into()))
        }
    }

    struct FailingStore;

    #[async_trait]
    impl RuleStore for FailingStore {
        async fn list_eligible_rules(
            &self,
            _now: DateTime<Utc>,
        ) -> Result<Vec<Arc<RedirectRule>>, RuleStoreError> {
            Err(RuleStoreError::Unavailable("connection refused".into()))
        }
    }

    async fn wait_for_records(log: &MemoryAccessLog, count: usize) {
        for _ in 0..100 {
            if log.len() >= count {
                return;
            }
            tokio::time::sleep(StdDuration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_redirect_is_logged() {
        let store = Arc::new(InMemoryRuleStore::new(vec![RedirectRule::url(
            1,
            "/tracked-page",
            "https://example.com/new-page",
        )]));
        let log = Arc::new(MemoryAccessLog::new());
        let engine = RedirectEngine::new(store, log.clone());

        let outcome = engine.handle(&InboundRequest::get("localhost", "/tracked-page")).await;
        let decision = outcome.decision().unwrap();
        assert_eq!(decision.location, "https://example.com/new-page");
        assert_eq!(decision.status, RedirectStatus::MovedPermanently);

        wait_for_records(&log, 1).await;
        let records = log.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rule_id, 1);
        assert_eq!(records[0].destination_url, "https://example.com/new-page");
    }

    #[tokio::test]
    async fn test_pass_through_is_not_logged() {
        let store = Arc::new(InMemoryRuleStore::new(vec![RedirectRule::url(
            1,
            "/exists",
            "https://example.com",
        )]));
        let log = Arc::new(MemoryAccessLog::new());
        let engine = RedirectEngine::new(store, log.clone());

        let outcome = engine.handle(&InboundRequest::get("localhost", "/missing")).await;
        assert_eq!(outcome, Outcome::PassThrough);
        tokio::time::sleep(StdDuration::from_millis(20)).await;
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_log_failure_does_not_change_outcome() {
        let store = Arc::new(InMemoryRuleStore::new(vec![RedirectRule::url(
            1,
            "/old",
            "https://example.com/new",
        )]));
        let engine = RedirectEngine::new(store, Arc::new(FailingSink));

        let outcome = engine.handle(&InboundRequest::get("localhost", "/old")).await;
        assert_eq!(outcome.decision().unwrap().location, "https://example.com/new");
    }

    #[tokio::test]
    async fn test_store_failure_passes_through() {
        let engine = RedirectEngine::new(Arc::new(FailingStore), Arc::new(MemoryAccessLog::new()));
        let outcome = engine.handle(&InboundRequest::get("localhost", "/old")).await;
        assert_eq!(outcome, Outcome::PassThrough);
    }

    #[tokio::test]
    async fn test_schedule_is_evaluated_at_request_time() {
        let now = Utc::now();
        let mut rule = RedirectRule::url(1, "/promo", "https://example.com/sale");
        rule.active_from = Some(now + Duration::days(1));
        let store = Arc::new(InMemoryRuleStore::new(vec![rule]));
        let engine = RedirectEngine::new(store, Arc::new(MemoryAccessLog::new()));
        let req = InboundRequest::get("localhost", "/promo");

        assert_eq!(engine.handle_at(&req, now).await, Outcome::PassThrough);
        assert!(matches!(
            engine.handle_at(&req, now + Duration::days(2)).await,
            Outcome::Redirect(_)
        ));
    }

    #[test]
    fn test_evaluate_has_no_side_effects() {
        let rules = vec![Arc::new(RedirectRule::url(1, "/a", "https://b.com"))];
        let req = InboundRequest::get("localhost", "/a");
        assert_eq!(evaluate(&rules, &req), evaluate(&rules, &req));
    }
}
