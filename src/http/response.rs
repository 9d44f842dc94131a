//! Response construction.
//!
//! # Responsibilities
//! - Turn a redirect decision into an HTTP response
//! - Answer requests no rule and no downstream handler claimed
//! - Answer the liveness check
//!
//! # Design Decisions
//! - Redirects carry only `Location` and an empty body
//! - `Location` is sent as raw bytes so non-ASCII destinations survive

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::engine::RedirectDecision;

/// Build the redirect response for `decision`.
pub fn redirect_response(decision: &RedirectDecision) -> Response {
    match HeaderValue::from_bytes(decision.location.as_bytes()) {
        Ok(location) => Response::builder()
            .status(decision.status.status_code())
            .header(header::LOCATION, location)
            .body(Body::empty())
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(e) => {
            tracing::error!(
                rule_id = decision.rule_id,
                location = %decision.location,
                error = %e,
                "Destination is not a valid Location header"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Liveness check handler.
pub async fn health() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// Fallback for requests that were not redirected.
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}
