//! Access log record for a completed redirect.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::request::InboundRequest;

const MAX_URL_LEN: usize = 1000;
const MAX_USER_AGENT_LEN: usize = 500;
const MAX_REFERER_LEN: usize = 1000;

/// One row per redirect served. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessLogRecord {
    pub rule_id: u64,
    pub request_domain: String,
    /// Path including query string.
    pub request_path: String,
    pub request_method: String,
    pub request_url: String,
    pub destination_url: String,
    pub status_code: u16,
    pub ip_address: Option<IpAddr>,
    pub user_agent: String,
    pub referer: String,
    pub created_at: DateTime<Utc>,
}

impl AccessLogRecord {
    pub fn new(
        request: &InboundRequest,
        rule_id: u64,
        destination: &str,
        status_code: u16,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            rule_id,
            request_domain: request.host.clone(),
            request_path: request.path_with_query.clone(),
            request_method: request.method.clone(),
            request_url: truncate(&request.full_url, MAX_URL_LEN),
            destination_url: truncate(destination, MAX_URL_LEN),
            status_code,
            ip_address: request.client_ip,
            user_agent: truncate(request.user_agent.as_deref().unwrap_or_default(), MAX_USER_AGENT_LEN),
            referer: truncate(request.referer.as_deref().unwrap_or_default(), MAX_REFERER_LEN),
            created_at,
        }
    }
}

/// Keep at most `max_chars` characters, never splitting a code point.
fn truncate(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}
