//! Redirect rule data model.
//!
//! Rules are read-only to the matching core. They are built from
//! configuration, frozen, and handed to the engine as shared snapshots.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a rule matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Match on the request host.
    Domain,
    /// Match on the request path.
    Url,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Domain => "domain",
            SourceType::Url => "url",
        }
    }
}

/// The pattern a rule matches, tagged by source type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "pattern", rename_all = "lowercase")]
pub enum RuleSource {
    /// Hostname pattern, optionally prefixed with `*.`.
    Domain(String),
    /// Path pattern, optionally suffixed with `*`.
    Url(String),
}

impl RuleSource {
    pub fn source_type(&self) -> SourceType {
        match self {
            RuleSource::Domain(_) => SourceType::Domain,
            RuleSource::Url(_) => SourceType::Url,
        }
    }

    pub fn pattern(&self) -> &str {
        match self {
            RuleSource::Domain(p) | RuleSource::Url(p) => p,
        }
    }
}

/// Trailing slash handling for non-file paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingSlashMode {
    /// Leave the path as-is.
    #[default]
    #[serde(alias = "ignore")]
    None,
    /// Append a trailing slash.
    Add,
    /// Strip trailing slashes.
    Remove,
}

/// Redirect status codes a rule may answer with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum RedirectStatus {
    #[default]
    MovedPermanently,
    Found,
    TemporaryRedirect,
    PermanentRedirect,
}

impl RedirectStatus {
    pub fn as_u16(&self) -> u16 {
        match self {
            RedirectStatus::MovedPermanently => 301,
            RedirectStatus::Found => 302,
            RedirectStatus::TemporaryRedirect => 307,
            RedirectStatus::PermanentRedirect => 308,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RedirectStatus::MovedPermanently => StatusCode::MOVED_PERMANENTLY,
            RedirectStatus::Found => StatusCode::FOUND,
            RedirectStatus::TemporaryRedirect => StatusCode::TEMPORARY_REDIRECT,
            RedirectStatus::PermanentRedirect => StatusCode::PERMANENT_REDIRECT,
        }
    }
}

/// Returned when a status code is not one of 301, 302, 307 or 308.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unsupported redirect status code {0} (expected 301, 302, 307 or 308)")]
pub struct InvalidStatus(pub u16);

impl TryFrom<u16> for RedirectStatus {
    type Error = InvalidStatus;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            301 => Ok(RedirectStatus::MovedPermanently),
            302 => Ok(RedirectStatus::Found),
            307 => Ok(RedirectStatus::TemporaryRedirect),
            308 => Ok(RedirectStatus::PermanentRedirect),
            other => Err(InvalidStatus(other)),
        }
    }
}

impl From<RedirectStatus> for u16 {
    fn from(status: RedirectStatus) -> Self {
        status.as_u16()
    }
}

/// A single operator-defined redirect rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectRule {
    /// Stable ordinal, used as the priority tie-breaker.
    pub id: u64,
    pub source: RuleSource,
    /// Absolute or scheme-relative destination URL.
    pub destination: String,
    pub preserve_path: bool,
    pub preserve_query_string: bool,
    pub force_https: bool,
    pub case_sensitive: bool,
    pub trailing_slash_mode: TrailingSlashMode,
    pub status: RedirectStatus,
    /// Higher is evaluated first.
    pub priority: i32,
    /// Manual kill switch.
    pub is_active: bool,
    pub active_from: Option<DateTime<Utc>>,
    pub active_until: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl RedirectRule {
    /// A URL rule with the column defaults: permanent redirect, query string
    /// preserved, everything else off.
    pub fn url(id: u64, path: impl Into<String>, destination: impl Into<String>) -> Self {
        Self::with_source(id, RuleSource::Url(path.into()), destination.into())
    }

    /// A domain rule with the same defaults as [`RedirectRule::url`].
    pub fn domain(id: u64, domain: impl Into<String>, destination: impl Into<String>) -> Self {
        Self::with_source(id, RuleSource::Domain(domain.into()), destination.into())
    }

    fn with_source(id: u64, source: RuleSource, destination: String) -> Self {
        Self {
            id,
            source,
            destination,
            preserve_path: false,
            preserve_query_string: true,
            force_https: false,
            case_sensitive: false,
            trailing_slash_mode: TrailingSlashMode::None,
            status: RedirectStatus::MovedPermanently,
            priority: 0,
            is_active: true,
            active_from: None,
            active_until: None,
            notes: None,
        }
    }

    pub fn source_type(&self) -> SourceType {
        self.source.source_type()
    }

    /// Whether the rule may take part in matching at `now`.
    ///
    /// Both schedule bounds are inclusive.
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        if self.active_from.is_some_and(|from| now < from) {
            return false;
        }
        if self.active_until.is_some_and(|until| now > until) {
            return false;
        }
        true
    }
}
