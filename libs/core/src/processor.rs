use std::sync::Arc;

use tracing::debug;

use crate::error::{DecodeError, DecryptError};
use crate::outcome::{ProcessingOutcome, ResolvedContent};
use crate::payload::MessageReceivedPayload;

/// Reverses the body encryption applied on the phone.
///
/// Implementations own their key material. Calls may block; callers decide about
/// timeouts and retries.
pub trait Decryptor: Send + Sync {
    fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptError>;
}

impl<F> Decryptor for F
where
    F: Fn(&str) -> Result<String, DecryptError> + Send + Sync,
{
    fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptError> {
        self(ciphertext)
    }
}

pub type SharedDecryptor = Arc<dyn Decryptor>;

/// Decodes a recognized payload and resolves its body.
///
/// Only a malformed payload fails the call. A failed decrypt keeps the original
/// ciphertext and records the error on the outcome.
pub fn process<D>(payload_bytes: &[u8], decryptor: &D) -> Result<ProcessingOutcome, DecodeError>
where
    D: Decryptor + ?Sized,
{
    let payload = MessageReceivedPayload::from_slice(payload_bytes)?;

    let content = if payload.encrypted {
        match decryptor.decrypt(&payload.content) {
            Ok(plaintext) => ResolvedContent::Plaintext(plaintext),
            Err(error) => ResolvedContent::Ciphertext {
                ciphertext: payload.content.clone(),
                error,
            },
        }
    } else {
        debug!(message_id = %payload.message_id, "content not encrypted; passing through");
        ResolvedContent::Plaintext(payload.content.clone())
    };

    Ok(ProcessingOutcome { payload, content })
}
