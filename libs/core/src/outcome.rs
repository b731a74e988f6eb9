use crate::error::DecryptError;
use crate::payload::MessageReceivedPayload;

/// Message body after the decrypt policy has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedContent {
    /// Content was never encrypted or decrypted successfully.
    Plaintext(String),
    /// Decryption failed; the original ciphertext is kept alongside the failure.
    Ciphertext {
        ciphertext: String,
        error: DecryptError,
    },
}

/// Normalised result handed to the outcome sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingOutcome {
    pub payload: MessageReceivedPayload,
    pub content: ResolvedContent,
}

impl ProcessingOutcome {
    /// The string to present as the message body.
    pub fn resolved_content(&self) -> &str {
        match &self.content {
            ResolvedContent::Plaintext(text) => text,
            ResolvedContent::Ciphertext { ciphertext, .. } => ciphertext,
        }
    }

    pub fn content_is_plaintext(&self) -> bool {
        matches!(self.content, ResolvedContent::Plaintext(_))
    }

    pub fn decrypt_error(&self) -> Option<&DecryptError> {
        match &self.content {
            ResolvedContent::Plaintext(_) => None,
            ResolvedContent::Ciphertext { error, .. } => Some(error),
        }
    }
}
