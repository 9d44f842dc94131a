//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every request
//! - Extract the redirect-relevant parts of a request (host, path, client)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Forwarded headers are only honoured when the listener is configured to
//!   trust them

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::engine::request::InboundRequest;

pub const X_REQUEST_ID: &str = "x-request-id";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Generates UUID v4 request ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Listener facts needed to interpret a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// The listener terminates TLS.
    pub tls: bool,
    /// Honour `X-Forwarded-Proto` and `X-Forwarded-For`.
    pub trust_forwarded_headers: bool,
}

fn header_str<'a>(headers: &'a HeaderMap, name: impl header::AsHeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Strip the port from a `Host` value, keeping IPv6 brackets.
pub fn strip_port(authority: &str) -> &str {
    if authority.starts_with('[') {
        return match authority.find(']') {
            Some(end) => &authority[..=end],
            None => authority,
        };
    }
    match authority.rsplit_once(':') {
        Some((host, port)) if port.bytes().all(|b| b.is_ascii_digit()) => host,
        _ => authority,
    }
}

/// Build the engine's view of an HTTP request.
pub fn inbound_request<B>(request: &Request<B>, context: RequestContext) -> InboundRequest {
    let headers = request.headers();

    let authority = header_str(headers, header::HOST)
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
        .unwrap_or_default();
    let path_with_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let forwarded_https = context.trust_forwarded_headers
        && header_str(headers, X_FORWARDED_PROTO)
            .and_then(|proto| proto.split(',').next())
            .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"));
    let secure = context.tls || forwarded_https;
    let scheme = if secure { "https" } else { "http" };

    let forwarded_ip = if context.trust_forwarded_headers {
        header_str(headers, X_FORWARDED_FOR)
            .and_then(|value| value.split(',').next())
            .and_then(|ip| ip.trim().parse::<IpAddr>().ok())
    } else {
        None
    };
    let peer_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    InboundRequest {
        host: strip_port(authority).to_string(),
        path_with_query: path_with_query.to_string(),
        method: request.method().to_string(),
        full_url: format!("{scheme}://{authority}{path_with_query}"),
        secure,
        client_ip: forwarded_ip.or(peer_ip),
        user_agent: header_str(headers, header::USER_AGENT).map(str::to_string),
        referer: header_str(headers, header::REFERER).map(str::to_string),
    }
}
