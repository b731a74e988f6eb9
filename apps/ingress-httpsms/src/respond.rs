use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use smshook_core::Ingested;

use crate::reqid::RequestId;

/// Fast 202 ACK describing what the pipeline did with the envelope.
pub fn ack202(request_id: Option<&RequestId>, ingested: &Ingested) -> Response {
    let rid = request_id
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "n/a".to_string());
    let body = match ingested {
        Ingested::Ignored(reason) => json!({
            "ok": true,
            "request_id": rid,
            "status": "ignored",
            "reason": reason.as_str(),
        }),
        Ingested::Processed(outcome) => json!({
            "ok": true,
            "request_id": rid,
            "status": "processed",
            "message_id": outcome.payload.message_id.to_string(),
            "content_is_plaintext": outcome.content_is_plaintext(),
        }),
    };
    (StatusCode::ACCEPTED, Json(body)).into_response()
}
