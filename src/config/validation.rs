//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every rule carries exactly the source its type needs
//! - Validate destinations, status codes and schedule windows
//! - Detect duplicate rule ids
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RedirectConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{AccessLogSinkKind, RedirectConfig, RuleConfig};
use crate::rules::model::{RedirectStatus, SourceType};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: `{value}` is not a valid socket address")]
    InvalidBindAddress { field: &'static str, value: String },

    #[error("rules[{index}]: {source_type} rule requires a non-empty `{field}`")]
    MissingSource {
        index: usize,
        source_type: &'static str,
        field: &'static str,
    },

    #[error("rules[{index}]: {source_type} rule must not set `{field}`")]
    ConflictingSource {
        index: usize,
        source_type: &'static str,
        field: &'static str,
    },

    #[error("rules[{index}]: destination `{destination}` must be an absolute or scheme-relative URL")]
    InvalidDestination { index: usize, destination: String },

    #[error("rules[{index}]: status {status} is not one of 301, 302, 307, 308")]
    InvalidStatus { index: usize, status: u16 },

    #[error("rules[{index}]: active_from must not be after active_until")]
    InvalidSchedule { index: usize },

    #[error("rule id {id} is used more than once")]
    DuplicateRuleId { id: u64 },

    #[error("access_log: file sink requires `path`")]
    MissingAccessLogPath,

    #[error("listener.tls: `{field}` must not be empty")]
    EmptyTlsPath { field: &'static str },
}

/// Ids for each rule, in declaration order. Rules without an explicit id are
/// numbered after the largest explicit one.
pub fn assign_rule_ids(rules: &[RuleConfig]) -> Vec<u64> {
    let mut next = rules.iter().filter_map(|r| r.id).max().unwrap_or(0) + 1;
    rules
        .iter()
        .map(|rule| {
            rule.id.unwrap_or_else(|| {
                let id = next;
                next += 1;
                id
            })
        })
        .collect()
}

/// Whether `destination` is something a `Location` header can point at.
pub fn is_valid_destination(destination: &str) -> bool {
    if destination.chars().any(char::is_control) {
        return false;
    }
    let lower = destination.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Url::parse(destination).is_ok_and(|url| url.has_host());
    }
    if destination.starts_with("//") {
        return Url::parse(&format!("http:{destination}")).is_ok_and(|url| url.has_host());
    }
    false
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &RedirectConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.admin.enabled {
        check_socket_addr(&mut errors, "admin.bind_address", &config.admin.bind_address);
    }
    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.trim().is_empty() {
            errors.push(ValidationError::EmptyTlsPath { field: "cert_path" });
        }
        if tls.key_path.trim().is_empty() {
            errors.push(ValidationError::EmptyTlsPath { field: "key_path" });
        }
    }

    if config.access_log.sink == AccessLogSinkKind::File
        && !config
            .access_log
            .path
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    {
        errors.push(ValidationError::MissingAccessLogPath);
    }

    for (index, rule) in config.rules.iter().enumerate() {
        validate_rule(&mut errors, index, rule);
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for id in assign_rule_ids(&config.rules) {
        if !seen.insert(id) && reported.insert(id) {
            errors.push(ValidationError::DuplicateRuleId { id });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn validate_rule(errors: &mut Vec<ValidationError>, index: usize, rule: &RuleConfig) {
    let non_empty = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());

    let (required, forbidden, required_field, forbidden_field) = match rule.source_type {
        SourceType::Domain => (&rule.domain, &rule.path, "domain", "path"),
        SourceType::Url => (&rule.path, &rule.domain, "path", "domain"),
    };
    let source_type = rule.source_type.as_str();
    if !non_empty(required) {
        errors.push(ValidationError::MissingSource {
            index,
            source_type,
            field: required_field,
        });
    }
    if forbidden.is_some() {
        errors.push(ValidationError::ConflictingSource {
            index,
            source_type,
            field: forbidden_field,
        });
    }

    if !is_valid_destination(&rule.destination) {
        errors.push(ValidationError::InvalidDestination {
            index,
            destination: rule.destination.clone(),
        });
    }

    if RedirectStatus::try_from(rule.status).is_err() {
        errors.push(ValidationError::InvalidStatus {
            index,
            status: rule.status,
        });
    }

    if let (Some(from), Some(until)) = (rule.active_from, rule.active_until) {
        if from > until {
            errors.push(ValidationError::InvalidSchedule { index });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TlsConfig;
    use chrono::{Duration, Utc};

    fn config_with(rules: Vec<RuleConfig>) -> RedirectConfig {
        RedirectConfig {
            rules,
            ..RedirectConfig::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&RedirectConfig::default()), Ok(()));
    }

    #[test]
    fn test_valid_rules() {
        let config = config_with(vec![
            RuleConfig::url("/old", "https://example.com/new"),
            RuleConfig::domain("*.oldsite.com", "//newsite.com"),
        ]);
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut missing_path = RuleConfig::url("", "https://example.com");
        missing_path.status = 200;
        let mut both = RuleConfig::domain("old.com", "ftp://example.com");
        both.path = Some("/x".into());

        let errors = validate_config(&config_with(vec![missing_path, both])).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::MissingSource {
                    index: 0,
                    source_type: "url",
                    field: "path"
                },
                ValidationError::InvalidStatus { index: 0, status: 200 },
                ValidationError::ConflictingSource {
                    index: 1,
                    source_type: "domain",
                    field: "path"
                },
                ValidationError::InvalidDestination {
                    index: 1,
                    destination: "ftp://example.com".into()
                },
            ]
        );
    }

    #[test]
    fn test_schedule_order() {
        let now = Utc::now();
        let mut rule = RuleConfig::url("/promo", "https://example.com/sale");
        rule.active_from = Some(now);
        rule.active_until = Some(now - Duration::hours(1));
        let errors = validate_config(&config_with(vec![rule])).unwrap_err();
        assert_eq!(errors, vec![ValidationError::InvalidSchedule { index: 0 }]);
    }

    #[test]
    fn test_duplicate_ids() {
        let mut a = RuleConfig::url("/a", "https://example.com");
        a.id = Some(3);
        let mut b = RuleConfig::url("/b", "https://example.com");
        b.id = Some(3);
        let errors = validate_config(&config_with(vec![a, b])).unwrap_err();
        assert_eq!(errors, vec![ValidationError::DuplicateRuleId { id: 3 }]);
    }

    #[test]
    fn test_assign_rule_ids() {
        let mut explicit = RuleConfig::url("/b", "https://example.com");
        explicit.id = Some(10);
        let rules = vec![
            RuleConfig::url("/a", "https://example.com"),
            explicit,
            RuleConfig::url("/c", "https://example.com"),
        ];
        assert_eq!(assign_rule_ids(&rules), vec![11, 10, 12]);
        assert_eq!(
            assign_rule_ids(&[RuleConfig::url("/a", "https://example.com")]),
            vec![1]
        );
    }

    #[test]
    fn test_listener_and_sinks() {
        let mut config = RedirectConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.listener.tls = Some(TlsConfig {
            cert_path: "".into(),
            key_path: "key.pem".into(),
        });
        config.access_log.sink = AccessLogSinkKind::File;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::MissingAccessLogPath));
        assert!(errors.contains(&ValidationError::EmptyTlsPath { field: "cert_path" }));
    }

    #[test]
    fn test_destination_forms() {
        assert!(is_valid_destination("https://example.com"));
        assert!(is_valid_destination("HTTP://example.com:8443/app?x=1#y"));
        assert!(is_valid_destination("//cdn.example.com/assets"));
        assert!(!is_valid_destination("/relative/path"));
        assert!(!is_valid_destination("mailto:someone@example.com"));
        assert!(!is_valid_destination(""));
        assert!(!is_valid_destination("https://example.com/a\r\nSet-Cookie: x"));
    }
}
