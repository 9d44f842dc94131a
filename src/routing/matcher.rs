//! Rule pattern matching.
//!
//! # Responsibilities
//! - Match the request host against a domain pattern (exact or `*.base`)
//! - Match the request path against a path pattern (exact or `prefix*`)
//! - Apply the rule's case sensitivity to both sides
//!
//! # Design Decisions
//! - Case-insensitive by default, per rule override
//! - A bare `base` host matches `*.base`
//! - Path comparison ignores the query string, except for one exact-match
//!   branch comparing the full path-plus-query (patterns that embed `?...`)
//! - No regex to guarantee O(n) matching

use std::borrow::Cow;

fn fold(value: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(value.to_lowercase())
    }
}

/// Strip the query string from a request target.
pub fn path_only(path_with_query: &str) -> &str {
    match path_with_query.split_once('?') {
        Some((path, _)) => path,
        None => path_with_query,
    }
}

/// Test a request host against a domain pattern.
pub fn matches_domain(request_host: &str, pattern: &str, case_sensitive: bool) -> bool {
    let host = fold(request_host, case_sensitive);
    let pattern = fold(pattern, case_sensitive);

    if host == pattern {
        return true;
    }

    match pattern.strip_prefix("*.") {
        Some(base) => {
            host == base
                || host
                    .strip_suffix(base)
                    .is_some_and(|subdomain| subdomain.ends_with('.'))
        }
        None => false,
    }
}

/// Test a request path (which may include a query string) against a path pattern.
pub fn matches_path(request_path_with_query: &str, pattern: &str, case_sensitive: bool) -> bool {
    let path = fold(path_only(request_path_with_query), case_sensitive);
    let pattern = fold(pattern, case_sensitive);

    if path == pattern {
        return true;
    }

    // Only reachable when the pattern itself carries a query string.
    if fold(request_path_with_query, case_sensitive) == pattern {
        return true;
    }

    if pattern.ends_with('*') {
        let prefix = pattern.trim_end_matches('*');
        return path.starts_with(prefix);
    }

    false
}
