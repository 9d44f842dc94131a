//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the redirect
//! proxy. All types derive Serde traits for deserialization from config files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rules::model::{SourceType, TrailingSlashMode};

/// Root configuration for the redirect proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RedirectConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Redirect rule definitions.
    pub rules: Vec<RuleConfig>,

    /// Where served redirects are recorded.
    pub access_log: AccessLogConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Read-only admin API.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration. Requests on a TLS listener count as secure.
    pub tls: Option<TlsConfig>,

    /// Trust `X-Forwarded-Proto` and `X-Forwarded-For` from a fronting proxy.
    pub trust_forwarded_headers: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
            trust_forwarded_headers: false,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// A redirect rule as written in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    /// Stable rule id. Assigned after the largest explicit id when omitted.
    #[serde(default)]
    pub id: Option<u64>,

    /// Whether the rule matches on host or on path.
    #[serde(rename = "type", default = "default_source_type")]
    pub source_type: SourceType,

    /// Source domain for domain rules (e.g., "oldsite.com", "*.oldsite.com").
    #[serde(default)]
    pub domain: Option<String>,

    /// Source path for url rules (e.g., "/old-page", "/blog/*").
    #[serde(default)]
    pub path: Option<String>,

    /// Destination URL.
    pub destination: String,

    #[serde(default)]
    pub preserve_path: bool,

    #[serde(default = "default_true")]
    pub preserve_query_string: bool,

    #[serde(default)]
    pub force_https: bool,

    #[serde(default)]
    pub case_sensitive: bool,

    #[serde(default)]
    pub trailing_slash: TrailingSlashMode,

    /// HTTP status code (301, 302, 307, 308).
    #[serde(default = "default_status")]
    pub status: u16,

    /// Rule priority (higher = checked first).
    #[serde(default)]
    pub priority: i32,

    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(default, with = "schedule_time")]
    pub active_from: Option<DateTime<Utc>>,

    #[serde(default, with = "schedule_time")]
    pub active_until: Option<DateTime<Utc>>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl RuleConfig {
    /// A url rule with every optional field at its default.
    pub fn url(path: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            id: None,
            source_type: SourceType::Url,
            domain: None,
            path: Some(path.into()),
            destination: destination.into(),
            preserve_path: false,
            preserve_query_string: true,
            force_https: false,
            case_sensitive: false,
            trailing_slash: TrailingSlashMode::None,
            status: default_status(),
            priority: 0,
            active: true,
            active_from: None,
            active_until: None,
            notes: None,
        }
    }

    /// A domain rule with every optional field at its default.
    pub fn domain(domain: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source_type: SourceType::Domain,
            domain: Some(domain.into()),
            path: None,
            ..Self::url("", destination)
        }
    }
}

fn default_source_type() -> SourceType {
    SourceType::Url
}

fn default_true() -> bool {
    true
}

fn default_status() -> u16 {
    301
}

/// Access log sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLogSinkKind {
    /// Structured `tracing` events on the `access_log` target.
    #[default]
    Tracing,
    /// JSON lines appended to `path`.
    File,
    /// Do not record redirects.
    Disabled,
}

/// Access log configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessLogConfig {
    pub sink: AccessLogSinkKind,

    /// File path for the `file` sink.
    pub path: Option<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

/// Schedule instants: RFC 3339, or `YYYY-MM-DD HH:MM:SS` read as UTC.
mod schedule_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const NAIVE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn parse(value: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(value, NAIVE_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|_| format!("invalid date `{value}`, expected RFC 3339 or {NAIVE_FORMAT}"))
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|value| parse(&value).map_err(serde::de::Error::custom))
            .transpose()
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::TimeZone;

        #[test]
        fn test_parse_formats() {
            let expected = Utc.with_ymd_and_hms(2024, 11, 12, 8, 30, 0).unwrap();
            assert_eq!(parse("2024-11-12T08:30:00Z").unwrap(), expected);
            assert_eq!(parse("2024-11-12T10:30:00+02:00").unwrap(), expected);
            assert_eq!(parse("2024-11-12 08:30:00").unwrap(), expected);
            assert!(parse("next tuesday").is_err());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: RedirectConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.rules.is_empty());
        assert_eq!(config.access_log.sink, AccessLogSinkKind::Tracing);
        assert!(!config.admin.enabled);
    }

    #[test]
    fn test_rule_defaults() {
        let config: RedirectConfig = toml::from_str(
            r#"
            [[rules]]
            path = "/old"
            destination = "https://example.com/new"
            "#,
        )
        .unwrap();
        let rule = &config.rules[0];
        assert_eq!(rule.source_type, SourceType::Url);
        assert!(rule.preserve_query_string);
        assert!(!rule.preserve_path);
        assert!(rule.active);
        assert_eq!(rule.status, 301);
        assert_eq!(rule.trailing_slash, TrailingSlashMode::None);
        assert_eq!(rule.active_from, None);
    }

    #[test]
    fn test_full_rule() {
        let config: RedirectConfig = toml::from_str(
            r#"
            [[rules]]
            id = 12
            type = "domain"
            domain = "*.oldsite.com"
            destination = "https://newsite.com"
            preserve_path = true
            preserve_query_string = false
            force_https = true
            case_sensitive = true
            trailing_slash = "remove"
            status = 308
            priority = -3
            active = false
            active_from = "2024-01-01 00:00:00"
            active_until = "2024-12-31T23:59:59Z"
            notes = "migration"
            "#,
        )
        .unwrap();
        let rule = &config.rules[0];
        assert_eq!(rule.id, Some(12));
        assert_eq!(rule.source_type, SourceType::Domain);
        assert_eq!(rule.domain.as_deref(), Some("*.oldsite.com"));
        assert_eq!(rule.trailing_slash, TrailingSlashMode::Remove);
        assert_eq!(rule.status, 308);
        assert_eq!(rule.priority, -3);
        assert!(!rule.active);
        assert!(rule.active_from.is_some());
        assert!(rule.active_until.is_some());
    }

    #[test]
    fn test_access_log_and_observability_sections() {
        let config: RedirectConfig = toml::from_str(
            r#"
            [access_log]
            sink = "file"
            path = "/var/log/redirects.log"

            [observability]
            log_format = "json"
            metrics_enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(config.access_log.sink, AccessLogSinkKind::File);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
    }
}
