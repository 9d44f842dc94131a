//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → middleware/redirect.rs (request.rs extracts InboundRequest)
//!     → RedirectEngine decides
//!         → response.rs builds the redirect
//!         → or the inner handler runs (404 fallback)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{inbound_request, MakeRequestUuid, RequestContext, X_REQUEST_ID};
pub use server::{HttpServer, ServerError};
