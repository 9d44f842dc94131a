//! Destination URL construction.
//!
//! # Responsibilities
//! - Start from the rule's destination
//! - Append the request path (preserve path) or normalize the destination's
//!   own path in place
//! - Append the request query string
//! - Upgrade an `http:` scheme for insecure requests when the rule forces HTTPS
//!
//! # Design Decisions
//! - Pure string rewriting: scheme, authority, query and fragment of the
//!   destination are never re-parsed or re-serialized
//! - No hidden state; identical inputs always produce identical output

use crate::engine::request::InboundRequest;
use crate::rewrite::trailing_slash::normalize;
use crate::rules::model::{RedirectRule, TrailingSlashMode};

/// Build the `Location` for a matched rule.
pub fn build_destination(request: &InboundRequest, rule: &RedirectRule) -> String {
    let mut destination = if rule.preserve_path {
        let base = rule.destination.trim_end_matches('/');
        let path = normalize(request.path(), rule.trailing_slash_mode);
        format!("{base}{path}")
    } else {
        normalize_destination_path(&rule.destination, rule.trailing_slash_mode)
    };

    if rule.preserve_query_string {
        if let Some(query) = request.query() {
            let separator = if destination.contains('?') { '&' } else { '?' };
            destination.push(separator);
            destination.push_str(query);
        }
    }

    if rule.force_https && !request.secure {
        destination = upgrade_scheme(destination);
    }

    destination
}

/// Replace a leading `http:` scheme token with `https:`.
pub fn upgrade_scheme(destination: String) -> String {
    match destination.strip_prefix("http:") {
        Some(rest) => format!("https:{rest}"),
        None => destination,
    }
}

/// Apply the trailing slash rule to the path component of `destination`,
/// leaving everything around it untouched.
fn normalize_destination_path(destination: &str, mode: TrailingSlashMode) -> String {
    let (start, end) = path_span(destination);
    if start == end {
        return destination.to_string();
    }

    let path = &destination[start..end];
    format!(
        "{}{}{}",
        &destination[..start],
        normalize(path, mode),
        &destination[end..]
    )
}

/// Byte range of the path component in an absolute, scheme-relative or
/// relative URL.
fn path_span(url: &str) -> (usize, usize) {
    let authority_start = if let Some(idx) = url.find("://") {
        idx + 3
    } else if url.starts_with("//") {
        2
    } else {
        0
    };

    let rest = &url[authority_start..];
    let start = if authority_start == 0 {
        0
    } else {
        authority_start + rest.find(['/', '?', '#']).unwrap_or(rest.len())
    };

    let end = start + url[start..].find(['?', '#']).unwrap_or(url.len() - start);
    (start, end)
}
