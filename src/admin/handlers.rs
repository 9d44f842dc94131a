use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::engine::{evaluate, InboundRequest, RedirectDecision};
use crate::rules::{RedirectRule, RuleStats, RuleStore};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub rules: RuleStats,
}

#[derive(Debug, Deserialize)]
pub struct MatchQuery {
    pub host: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
}

fn default_path() -> String {
    "/".to_string()
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub matched: bool,
    pub decision: Option<RedirectDecision>,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        rules: state.store.stats(Utc::now()),
    })
}

/// Every configured rule in evaluation order, including inactive ones.
pub async fn get_rules(State(state): State<AdminState>) -> Json<Vec<RedirectRule>> {
    let rules = state
        .store
        .snapshot()
        .iter()
        .map(|rule| rule.as_ref().clone())
        .collect();
    Json(rules)
}

/// Dry run over the same eligible-rule read path live traffic uses.
pub async fn get_match(
    State(state): State<AdminState>,
    Query(query): Query<MatchQuery>,
) -> Json<MatchResponse> {
    let eligible = match state.store.list_eligible_rules(Utc::now()).await {
        Ok(rules) => rules,
        Err(e) => {
            tracing::error!(error = %e, "Rule store query failed, reporting no match");
            Vec::new()
        }
    };

    let request = InboundRequest::get(query.host, query.path).with_secure(query.secure);
    let decision = evaluate(&eligible, &request).decision().cloned();

    Json(MatchResponse {
        matched: decision.is_some(),
        decision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::setup_admin_router;
    use crate::rules::{InMemoryRuleStore, RedirectStatus};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router() -> axum::Router {
        let mut inactive = RedirectRule::url(2, "/gone", "https://b.com");
        inactive.is_active = false;
        let mut promo = RedirectRule::url(1, "/promo", "https://shop.com/sale");
        promo.status = RedirectStatus::Found;
        let store = Arc::new(InMemoryRuleStore::new(vec![
            promo,
            inactive,
            RedirectRule::domain(3, "*.old.com", "https://new.com"),
        ]));
        setup_admin_router(AdminState { store })
    }

    async fn get_json(uri: &str) -> serde_json::Value {
        let response = router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_status_reports_rule_stats() {
        let json = get_json("/admin/status").await;
        assert_eq!(json["status"], "operational");
        assert_eq!(json["rules"]["total"], 3);
        assert_eq!(json["rules"]["eligible"], 2);
        assert_eq!(json["rules"]["domain"], 1);
        assert_eq!(json["rules"]["url"], 2);
    }

    #[tokio::test]
    async fn test_rules_lists_snapshot() {
        let json = get_json("/admin/rules").await;
        assert_eq!(json.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_match_dry_run() {
        let json = get_json("/admin/match?host=shop.com&path=/promo?ref=x").await;
        assert_eq!(json["matched"], true);
        assert_eq!(json["decision"]["rule_id"], 1);
        assert_eq!(json["decision"]["status"], 302);
        assert_eq!(json["decision"]["location"], "https://shop.com/sale?ref=x");
    }

    #[tokio::test]
    async fn test_match_honours_schedule_and_priority() {
        let now = Utc::now();
        let mut scheduled = RedirectRule::url(1, "/promo", "https://later.com");
        scheduled.priority = 10;
        scheduled.active_from = Some(now + chrono::Duration::days(1));
        let fallback = RedirectRule::url(2, "/promo", "https://now.com");
        let store = Arc::new(InMemoryRuleStore::new(vec![scheduled, fallback]));

        let Json(response) = get_match(
            State(AdminState { store }),
            Query(MatchQuery {
                host: "a.com".into(),
                path: "/promo".into(),
                secure: false,
            }),
        )
        .await;

        assert!(response.matched);
        assert_eq!(response.decision.unwrap().location, "https://now.com");
    }

    #[tokio::test]
    async fn test_match_skips_inactive_rules() {
        let json = get_json("/admin/match?host=a.com&path=/gone").await;
        assert_eq!(json["matched"], false);
        assert!(json["decision"].is_null());
    }
}
