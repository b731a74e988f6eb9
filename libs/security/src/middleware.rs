use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use crate::jwt::BearerAuthorizer;

/// Host-level authorization settings, installed as a request extension.
#[derive(Clone, Debug, Default)]
pub struct AuthPolicy {
    pub authorizer: Option<Arc<BearerAuthorizer>>,
    /// Reject requests that carry no `Authorization` header at all.
    pub require_header: bool,
}

impl AuthPolicy {
    pub fn new(authorizer: Option<BearerAuthorizer>, require_header: bool) -> Self {
        Self {
            authorizer: authorizer.map(Arc::new),
            require_header,
        }
    }
}

/// Gatekeeper in front of the ingestion routes.
///
/// With no authorizer configured every request passes. Otherwise a present
/// `Authorization` header must verify; a missing one is only rejected when
/// `require_header` is set.
pub async fn authorize_request(req: Request<Body>, next: Next) -> Response {
    let policy = req
        .extensions()
        .get::<AuthPolicy>()
        .cloned()
        .unwrap_or_default();
    let Some(authorizer) = policy.authorizer else {
        return next.run(req).await;
    };

    let credential = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default());
    match credential {
        Some(credential) => {
            if let Err(err) = authorizer.authorize(credential) {
                warn!(path = %req.uri().path(), "rejecting webhook: {err}");
                return unauthorized();
            }
        }
        None if policy.require_header => {
            warn!(path = %req.uri().path(), "rejecting webhook without authorization header");
            return unauthorized();
        }
        None => {}
    }
    next.run(req).await
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized" })),
    )
        .into_response()
}
