//! Redirect middleware.
//!
//! Runs every request through the [`RedirectEngine`]. Matched requests are
//! answered with a redirect; everything else reaches the inner service.
//! The liveness path always bypasses the engine.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::engine::{Outcome, RedirectEngine};
use crate::http::request::{inbound_request, RequestContext};
use crate::http::response::redirect_response;

/// Path of the liveness check. Redirect rules never apply to it.
pub const HEALTH_PATH: &str = "/up";

#[derive(Clone)]
pub struct RedirectState {
    pub engine: RedirectEngine,
    pub context: RequestContext,
}

pub async fn redirect_middleware(
    State(state): State<RedirectState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.uri().path() == HEALTH_PATH {
        return next.run(request).await;
    }

    let inbound = inbound_request(&request, state.context);
    match state.engine.handle(&inbound).await {
        Outcome::Redirect(decision) => redirect_response(&decision),
        Outcome::PassThrough => next.run(request).await,
    }
}
