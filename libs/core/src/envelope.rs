use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;

use crate::error::EnvelopeError;

/// Event type emitted when a phone receives a new message.
pub const EVENT_TYPE_MESSAGE_PHONE_RECEIVED: &str = "message.phone.received";
pub const APPLICATION_JSON: &str = "application/json";
/// Content type of a CloudEvents structured-mode HTTP body.
pub const APPLICATION_CLOUDEVENTS_JSON: &str = "application/cloudevents+json";

/// Event types this pipeline understands.
///
/// ```
/// use smshook_core::EventKind;
///
/// let kind = EventKind::from_type("message.phone.received");
/// assert_eq!(kind, Some(EventKind::MessagePhoneReceived));
/// assert_eq!(EventKind::from_type("message.phone.sent"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MessagePhoneReceived,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::MessagePhoneReceived => EVENT_TYPE_MESSAGE_PHONE_RECEIVED,
        }
    }

    pub fn from_type(event_type: &str) -> Option<Self> {
        match event_type {
            EVENT_TYPE_MESSAGE_PHONE_RECEIVED => Some(EventKind::MessagePhoneReceived),
            _ => None,
        }
    }
}

/// Serializations of `data` this pipeline can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentEncoding {
    Json,
}

impl ContentEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEncoding::Json => APPLICATION_JSON,
        }
    }

    /// Matches on the media type only; parameters such as `charset` are ignored.
    pub fn from_media_type(value: &str) -> Option<Self> {
        let media_type = value.split(';').next().unwrap_or_default().trim();
        if media_type.eq_ignore_ascii_case(APPLICATION_JSON) {
            Some(ContentEncoding::Json)
        } else {
            None
        }
    }
}

/// Generic event wrapper as delivered by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub id: Option<String>,
    pub source: Option<String>,
    pub event_type: String,
    pub content_encoding: Option<String>,
    pub data: Bytes,
}

impl Envelope {
    pub fn new(
        event_type: impl Into<String>,
        content_encoding: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            id: None,
            source: None,
            event_type: event_type.into(),
            content_encoding: Some(content_encoding.into()),
            data: data.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Parses a CloudEvents structured-mode JSON document.
    ///
    /// Inline `data` without a `datacontenttype` is treated as `application/json`.
    pub fn from_structured_json(body: &[u8]) -> Result<Self, EnvelopeError> {
        let raw: StructuredEvent = serde_json::from_slice(body)?;
        let event_type = raw.event_type.ok_or(EnvelopeError::MissingAttribute("type"))?;

        let (content_encoding, data) = match (raw.data, raw.data_base64) {
            (Some(_), Some(_)) => return Err(EnvelopeError::ConflictingData),
            (Some(value), None) => {
                let content_encoding = raw
                    .datacontenttype
                    .unwrap_or_else(|| APPLICATION_JSON.to_string());
                let data = inline_data_bytes(&content_encoding, value)?;
                (Some(content_encoding), data)
            }
            (None, Some(encoded)) => (raw.datacontenttype, Bytes::from(B64.decode(encoded)?)),
            (None, None) => (raw.datacontenttype, Bytes::new()),
        };

        Ok(Self {
            id: raw.id,
            source: raw.source,
            event_type,
            content_encoding,
            data,
        })
    }
}

#[derive(Debug, Deserialize)]
struct StructuredEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(rename = "type")]
    #[serde(default)]
    event_type: Option<String>,
    #[serde(default)]
    datacontenttype: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    data_base64: Option<String>,
}

fn inline_data_bytes(content_encoding: &str, value: Value) -> Result<Bytes, EnvelopeError> {
    match (ContentEncoding::from_media_type(content_encoding), value) {
        (None, Value::String(text)) => Ok(Bytes::from(text)),
        (_, value) => Ok(Bytes::from(serde_json::to_vec(&value)?)),
    }
}

/// An envelope that matched both the taxonomy and the encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedEvent {
    pub kind: EventKind,
    pub encoding: ContentEncoding,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    UnknownEventType,
    UnsupportedEncoding,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::UnknownEventType => "unknown_event_type",
            IgnoreReason::UnsupportedEncoding => "unsupported_encoding",
        }
    }
}

/// Result of checking an envelope against the known taxonomy.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Recognized(RecognizedEvent),
    Ignored(IgnoreReason),
}

impl Admission {
    pub fn is_recognized(&self) -> bool {
        matches!(self, Admission::Recognized(_))
    }
}

/// Admits an envelope only when both event type and content encoding are known.
///
/// Unknown envelopes are not errors: a mixed event stream may hit the same endpoint.
///
/// The encoding check is looser than byte equality with `application/json`:
/// case is folded and media-type parameters are dropped, so
/// `Application/JSON; charset=utf-8` is admitted.
pub fn admit(envelope: &Envelope) -> Admission {
    let Some(kind) = EventKind::from_type(&envelope.event_type) else {
        return Admission::Ignored(IgnoreReason::UnknownEventType);
    };
    let Some(encoding) = envelope
        .content_encoding
        .as_deref()
        .and_then(ContentEncoding::from_media_type)
    else {
        return Admission::Ignored(IgnoreReason::UnsupportedEncoding);
    };
    Admission::Recognized(RecognizedEvent {
        kind,
        encoding,
        data: envelope.data.clone(),
    })
}
