//! Inbound request model consumed by the engine.

use std::net::IpAddr;

use crate::routing::matcher::path_only;

/// The parts of an HTTP request the redirect engine looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    /// Request host without port.
    pub host: String,
    /// Path including the query string, e.g. `/page?ref=email`.
    pub path_with_query: String,
    pub method: String,
    /// Full request URL as the client addressed it.
    pub full_url: String,
    /// Whether the request arrived over TLS.
    pub secure: bool,
    pub client_ip: Option<IpAddr>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl InboundRequest {
    /// A plain `GET` request, mostly useful for dry runs and tests.
    pub fn get(host: impl Into<String>, path_with_query: impl Into<String>) -> Self {
        let host = host.into();
        let path_with_query = path_with_query.into();
        let full_url = format!("http://{host}{path_with_query}");
        Self {
            host,
            path_with_query,
            method: "GET".to_string(),
            full_url,
            secure: false,
            client_ip: None,
            user_agent: None,
            referer: None,
        }
    }

    /// Mark the request as secure and fix up the full URL scheme.
    pub fn with_secure(mut self, secure: bool) -> Self {
        if secure != self.secure {
            let (from, to) = if secure {
                ("http://", "https://")
            } else {
                ("https://", "http://")
            };
            if let Some(rest) = self.full_url.strip_prefix(from) {
                self.full_url = format!("{to}{rest}");
            }
        }
        self.secure = secure;
        self
    }

    /// Request path without the query string, `/` when empty.
    pub fn path(&self) -> &str {
        match path_only(&self.path_with_query) {
            "" => "/",
            path => path,
        }
    }

    /// Raw query string, if the request carries a non-empty one.
    pub fn query(&self) -> Option<&str> {
        self.path_with_query
            .split_once('?')
            .map(|(_, query)| query)
            .filter(|query| !query.is_empty())
    }
}
