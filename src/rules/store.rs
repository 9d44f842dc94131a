//! Rule store contract and the in-memory implementation.
//!
//! # Responsibilities
//! - Hand the engine a consistent snapshot of eligible rules per request
//! - Pre-filter by eligibility and pre-sort by `(priority desc, id asc)`
//! - Swap the whole rule set atomically on reload
//!
//! # Design Decisions
//! - The engine never re-sorts or re-filters what the store returns
//! - Readers never block writers: the rule set lives behind an `ArcSwap`

use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::rules::model::{RedirectRule, SourceType};

/// Errors a rule store may report.
#[derive(Debug, Error)]
pub enum RuleStoreError {
    /// The backing store could not be queried.
    #[error("rule store unavailable: {0}")]
    Unavailable(String),
}

/// Read path into rule data.
#[async_trait]
pub trait RuleStore: Send + Sync + 'static {
    /// Rules eligible at `now`, ordered by priority descending then id ascending.
    async fn list_eligible_rules(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Arc<RedirectRule>>, RuleStoreError>;
}

/// Counts reported on the admin status endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RuleStats {
    pub total: usize,
    pub eligible: usize,
    pub domain: usize,
    pub url: usize,
}

/// Orders rules the way the selector expects to scan them.
pub fn sort_rules(rules: &mut [Arc<RedirectRule>]) {
    rules.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
}

/// Rule store backed by an atomically swappable in-memory snapshot.
#[derive(Debug)]
pub struct InMemoryRuleStore {
    rules: ArcSwap<Vec<Arc<RedirectRule>>>,
}

impl InMemoryRuleStore {
    pub fn new(rules: Vec<RedirectRule>) -> Self {
        Self {
            rules: ArcSwap::from_pointee(Self::prepare(rules)),
        }
    }

    /// Replace every rule at once. In-flight requests keep the snapshot they
    /// already loaded.
    pub fn replace(&self, rules: Vec<RedirectRule>) {
        let prepared = Self::prepare(rules);
        let count = prepared.len();
        self.rules.store(Arc::new(prepared));
        tracing::info!(rules = count, "Rule set replaced");
    }

    /// Every rule, eligible or not, in evaluation order.
    pub fn snapshot(&self) -> Arc<Vec<Arc<RedirectRule>>> {
        self.rules.load_full()
    }

    pub fn stats(&self, now: DateTime<Utc>) -> RuleStats {
        let rules = self.rules.load();
        let mut stats = RuleStats {
            total: rules.len(),
            ..RuleStats::default()
        };
        for rule in rules.iter() {
            if rule.is_eligible(now) {
                stats.eligible += 1;
            }
            match rule.source_type() {
                SourceType::Domain => stats.domain += 1,
                SourceType::Url => stats.url += 1,
            }
        }
        stats
    }

    fn prepare(rules: Vec<RedirectRule>) -> Vec<Arc<RedirectRule>> {
        let mut rules: Vec<_> = rules.into_iter().map(Arc::new).collect();
        sort_rules(&mut rules);
        rules
    }
}

impl Default for InMemoryRuleStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl RuleStore for InMemoryRuleStore {
    async fn list_eligible_rules(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Arc<RedirectRule>>, RuleStoreError> {
        let rules = self.rules.load();
        Ok(rules
            .iter()
            .filter(|rule| rule.is_eligible(now))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn rule(id: u64, priority: i32) -> RedirectRule {
        let mut rule = RedirectRule::url(id, format!("/r{id}"), "https://example.com");
        rule.priority = priority;
        rule
    }

    #[tokio::test]
    async fn test_orders_by_priority_then_id() {
        let store = InMemoryRuleStore::new(vec![rule(3, 0), rule(1, 5), rule(2, 5), rule(4, -1)]);
        let ids: Vec<u64> = store
            .list_eligible_rules(Utc::now())
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_filters_ineligible_rules() {
        let now = Utc::now();
        let mut inactive = rule(1, 0);
        inactive.is_active = false;
        let mut future = rule(2, 0);
        future.active_from = Some(now + Duration::hours(1));
        let mut expired = rule(3, 0);
        expired.active_until = Some(now - Duration::hours(1));
        let live = rule(4, 0);

        let store = InMemoryRuleStore::new(vec![inactive, future, expired, live]);
        let eligible = store.list_eligible_rules(now).await.unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, 4);

        let stats = store.stats(now);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.eligible, 1);
        assert_eq!(stats.url, 4);
        assert_eq!(stats.domain, 0);
    }

    #[tokio::test]
    async fn test_replace_swaps_snapshot() {
        let store = InMemoryRuleStore::new(vec![rule(1, 0)]);
        let before = store.snapshot();

        store.replace(vec![rule(7, 0), rule(8, 1)]);

        assert_eq!(before.len(), 1, "old snapshot is untouched");
        let ids: Vec<u64> = store.snapshot().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![8, 7]);
    }
}
