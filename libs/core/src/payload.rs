use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::DecodeError;

/// Payload of a `message.phone.received` event.
///
/// ```
/// use smshook_core::MessageReceivedPayload;
///
/// let payload = MessageReceivedPayload::from_slice(br#"{
///     "message_id": "5e0c1a2b-7d33-4c55-9f3e-0a1b2c3d4e5f",
///     "user_id": "user-1",
///     "owner": "+18005550100",
///     "contact": "+18005550199",
///     "timestamp": "2024-01-01T00:00:00Z",
///     "content": "hello",
///     "encrypted": false,
///     "sim": "SIM1"
/// }"#).unwrap();
/// assert_eq!(payload.content, "hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceivedPayload {
    pub message_id: Uuid,
    pub user_id: String,
    pub owner: String,
    pub contact: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub content: String,
    pub encrypted: bool,
    pub sim: String, // SIM1 or SIM2
}

impl MessageReceivedPayload {
    /// Decodes a JSON payload. Unknown fields are tolerated, missing ones are not.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn sample() -> serde_json::Value {
        json!({
            "message_id": "5e0c1a2b-7d33-4c55-9f3e-0a1b2c3d4e5f",
            "user_id": "user-1",
            "owner": "+18005550100",
            "contact": "+18005550199",
            "timestamp": "2024-03-05T10:11:12.123456Z",
            "content": "hello",
            "encrypted": false,
            "sim": "SIM2",
            "request_id": "ignored-extra-field"
        })
    }

    #[test]
    fn decodes_full_payload() {
        let payload =
            MessageReceivedPayload::from_slice(&serde_json::to_vec(&sample()).unwrap()).unwrap();
        assert_eq!(payload.user_id, "user-1");
        assert_eq!(payload.sim, "SIM2");
        assert!(!payload.encrypted);
        assert_eq!(payload.timestamp, datetime!(2024-03-05 10:11:12.123456 UTC));
    }

    #[test]
    fn missing_field_is_decode_error() {
        let mut value = sample();
        value.as_object_mut().unwrap().remove("owner");
        let err = MessageReceivedPayload::from_slice(&serde_json::to_vec(&value).unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("owner"));
    }

    #[test]
    fn wrong_type_for_encrypted_is_decode_error() {
        let mut value = sample();
        value["encrypted"] = json!("yes");
        assert!(
            MessageReceivedPayload::from_slice(&serde_json::to_vec(&value).unwrap()).is_err()
        );
    }

    #[test]
    fn non_uuid_message_id_is_decode_error() {
        let mut value = sample();
        value["message_id"] = json!("msg-1");
        assert!(
            MessageReceivedPayload::from_slice(&serde_json::to_vec(&value).unwrap()).is_err()
        );
    }
}
