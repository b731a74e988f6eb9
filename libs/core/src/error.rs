use thiserror::Error;

/// The payload of a recognized envelope could not be decoded.
///
/// This is the only hard failure of the pipeline: no outcome is produced.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed message payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Failure reported by a decrypt capability.
///
/// The pipeline never propagates this; it is attached to the outcome instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecryptError {
    #[error("encryption key not configured")]
    KeyMissing,
    #[error("ciphertext is not valid base64: {0}")]
    Encoding(String),
    #[error("ciphertext too short: {len} bytes, need at least {min}")]
    Truncated { len: usize, min: usize },
    #[error("decrypted content is not valid utf-8")]
    NotUtf8,
    #[error("decrypt failed: {0}")]
    Failed(String),
}

/// The transport handed over something that is not an envelope at all.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("invalid cloudevent json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid data_base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("cloudevent carries both data and data_base64")]
    ConflictingData,
    #[error("missing cloudevent attribute: {0}")]
    MissingAttribute(&'static str),
}
