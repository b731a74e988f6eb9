use std::sync::Arc;

use tracing::{error, info};

use crate::outcome::{ProcessingOutcome, ResolvedContent};

/// Receives every outcome the pipeline produces. Fire-and-forget.
pub trait OutcomeSink: Send + Sync {
    fn emit(&self, outcome: &ProcessingOutcome);
}

pub type SharedSink = Arc<dyn OutcomeSink>;

/// Whether undecryptable content is written to the log stream as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CiphertextLogging {
    #[default]
    Redact,
    Include,
}

impl CiphertextLogging {
    pub fn from_flag(include: bool) -> Self {
        if include {
            CiphertextLogging::Include
        } else {
            CiphertextLogging::Redact
        }
    }

    fn render(&self, ciphertext: &str) -> String {
        match self {
            CiphertextLogging::Include => ciphertext.to_string(),
            CiphertextLogging::Redact => format!("<redacted {} bytes>", ciphertext.len()),
        }
    }
}

/// Writes outcomes to the `tracing` log stream.
#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    ciphertext: CiphertextLogging,
}

impl TracingSink {
    pub fn new(ciphertext: CiphertextLogging) -> Self {
        Self { ciphertext }
    }
}

impl OutcomeSink for TracingSink {
    fn emit(&self, outcome: &ProcessingOutcome) {
        let payload = &outcome.payload;
        match &outcome.content {
            ResolvedContent::Plaintext(content) => {
                info!(
                    message_id = %payload.message_id,
                    from = %payload.contact,
                    to = %payload.owner,
                    encrypted = payload.encrypted,
                    sim = %payload.sim,
                    content = %content,
                    "sms received"
                );
            }
            ResolvedContent::Ciphertext { ciphertext, error } => {
                error!(
                    message_id = %payload.message_id,
                    from = %payload.contact,
                    to = %payload.owner,
                    encrypted = payload.encrypted,
                    sim = %payload.sim,
                    error = %error,
                    ciphertext = %self.ciphertext.render(ciphertext),
                    "sms content could not be decrypted; check the configured encryption key"
                );
            }
        }
    }
}
