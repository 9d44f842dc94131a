//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RedirectConfig;
use crate::config::validation::{assign_rule_ids, validate_config, ValidationError};
use crate::rules::model::{RedirectRule, RedirectStatus, RuleSource, SourceType};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RedirectConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse, sanitize and validate configuration text.
pub fn parse_config(content: &str) -> Result<RedirectConfig, ConfigError> {
    let mut config: RedirectConfig = toml::from_str(content)?;
    sanitize_rules(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn sanitize_rules(config: &mut RedirectConfig) {
    for rule in &mut config.rules {
        if let Some(domain) = rule.domain.as_mut() {
            *domain = sanitize_domain(domain);
        }
    }
}

/// Reduce whatever an operator typed as a source domain to a bare host
/// pattern: scheme and anything from the first `/` on are dropped. Case and
/// `*.` wildcards are kept.
pub fn sanitize_domain(domain: &str) -> String {
    let trimmed = domain.trim();
    let lower = trimmed.to_ascii_lowercase();
    let without_scheme = ["https://", "http://"]
        .iter()
        .find(|scheme| lower.starts_with(*scheme))
        .map_or(trimmed, |scheme| &trimmed[scheme.len()..]);

    match without_scheme.split_once('/') {
        Some((host, _)) => host.to_string(),
        None => without_scheme.to_string(),
    }
}

/// Turn rule configuration into frozen rules.
///
/// Domains are sanitized and the whole config is validated first, so a
/// config built in code or received over the reload channel gets the same
/// checks as one read from disk.
pub fn compile_rules(config: &RedirectConfig) -> Result<Vec<RedirectRule>, ConfigError> {
    let mut config = config.clone();
    sanitize_rules(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    let mut rules = Vec::with_capacity(config.rules.len());
    let mut errors = Vec::new();

    for (index, (rule, id)) in config
        .rules
        .iter()
        .zip(assign_rule_ids(&config.rules))
        .enumerate()
    {
        let status = match RedirectStatus::try_from(rule.status) {
            Ok(status) => status,
            Err(_) => {
                errors.push(ValidationError::InvalidStatus {
                    index,
                    status: rule.status,
                });
                continue;
            }
        };

        let source = match rule.source_type {
            SourceType::Domain => rule.domain.clone().map(RuleSource::Domain),
            SourceType::Url => rule.path.clone().map(RuleSource::Url),
        };
        let Some(source) = source else {
            errors.push(ValidationError::MissingSource {
                index,
                source_type: rule.source_type.as_str(),
                field: match rule.source_type {
                    SourceType::Domain => "domain",
                    SourceType::Url => "path",
                },
            });
            continue;
        };

        rules.push(RedirectRule {
            id,
            source,
            destination: rule.destination.clone(),
            preserve_path: rule.preserve_path,
            preserve_query_string: rule.preserve_query_string,
            force_https: rule.force_https,
            case_sensitive: rule.case_sensitive,
            trailing_slash_mode: rule.trailing_slash,
            status,
            priority: rule.priority,
            is_active: rule.active,
            active_from: rule.active_from,
            active_until: rule.active_until,
            notes: rule.notes.clone(),
        });
    }

    if errors.is_empty() {
        Ok(rules)
    } else {
        Err(ConfigError::Validation(errors))
    }
}
