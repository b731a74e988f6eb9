use axum::{
    Extension, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use security::{AuthPolicy, authorize_request};
use smshook_core::{APPLICATION_CLOUDEVENTS_JSON, Envelope, EnvelopeError, Pipeline};
use tracing::{debug, info_span};

use crate::error::IngressError;
use crate::reqid::{RequestId, with_request_id};
use crate::respond::ack202;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
}

/// Webhook routes behind the auth gate, plus an open health probe.
pub fn build_router(state: AppState, policy: AuthPolicy) -> Router {
    let ingest = Router::new()
        .route("/webhook", post(handle_structured))
        .route("/webhook/", post(handle_structured))
        .route("/", post(handle_binary))
        .layer(middleware::from_fn(authorize_request))
        .layer(Extension(policy));

    Router::new()
        .route("/healthz", get(healthz))
        .merge(ingest)
        .with_state(state)
        .layer(middleware::from_fn(with_request_id))
}

async fn healthz() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// CloudEvents structured mode: the whole event is the JSON body.
async fn handle_structured(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Response, IngressError> {
    let envelope = Envelope::from_structured_json(&body)?;
    ingest(state, request_id, envelope).await
}

/// CloudEvents HTTP binding: binary mode via `ce-*` headers, or structured
/// mode when the body is `application/cloudevents+json`.
async fn handle_binary(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, IngressError> {
    let envelope = if is_structured(&headers) {
        Envelope::from_structured_json(&body)?
    } else {
        envelope_from_headers(&headers, body)?
    };
    ingest(state, request_id, envelope).await
}

fn is_structured(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|media| {
            media
                .trim()
                .eq_ignore_ascii_case(APPLICATION_CLOUDEVENTS_JSON)
        })
}

/// Builds an envelope from binary-mode CloudEvents headers.
pub fn envelope_from_headers(headers: &HeaderMap, body: Bytes) -> Result<Envelope, EnvelopeError> {
    let attr = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let event_type = attr("ce-type").ok_or(EnvelopeError::MissingAttribute("ce-type"))?;
    Ok(Envelope {
        id: attr("ce-id"),
        source: attr("ce-source"),
        event_type,
        content_encoding: attr(header::CONTENT_TYPE.as_str()),
        data: body,
    })
}

async fn ingest(
    state: AppState,
    request_id: RequestId,
    envelope: Envelope,
) -> Result<Response, IngressError> {
    let span = info_span!(
        "ingress.handle",
        request_id = %request_id.0,
        source = envelope.source.as_deref().unwrap_or_default()
    );
    debug!(parent: &span, event_type = %envelope.event_type, "received event");

    // The decrypt capability may block.
    let pipeline = state.pipeline.clone();
    let ingested = tokio::task::spawn_blocking(move || span.in_scope(|| pipeline.ingest(&envelope)))
        .await
        .map_err(IngressError::Internal)??;

    Ok(ack202(Some(&request_id), &ingested))
}
