use tracing::{debug, field, info_span, warn};

use crate::envelope::{Admission, Envelope, IgnoreReason, admit};
use crate::error::DecodeError;
use crate::outcome::ProcessingOutcome;
use crate::processor::{SharedDecryptor, process};
use crate::sink::SharedSink;

/// What happened to a single envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingested {
    Ignored(IgnoreReason),
    Processed(ProcessingOutcome),
}

/// Validator and processor wired to their injected capabilities.
///
/// Holds no mutable state; clones share the same decryptor and sink.
#[derive(Clone)]
pub struct Pipeline {
    decryptor: SharedDecryptor,
    sink: SharedSink,
}

impl Pipeline {
    pub fn new(decryptor: SharedDecryptor, sink: SharedSink) -> Self {
        Self { decryptor, sink }
    }

    /// Runs one envelope through admission, decoding and the decrypt policy.
    ///
    /// Ignored envelopes never reach the sink. A decode failure is returned and
    /// nothing is emitted.
    pub fn ingest(&self, envelope: &Envelope) -> Result<Ingested, DecodeError> {
        let span = info_span!(
            "pipeline.ingest",
            event_type = %envelope.event_type,
            event_id = envelope.id.as_deref().unwrap_or_default(),
            message_id = field::Empty
        );
        let _entered = span.enter();

        let event = match admit(envelope) {
            Admission::Recognized(event) => event,
            Admission::Ignored(reason) => {
                debug!(?reason, "envelope ignored");
                return Ok(Ingested::Ignored(reason));
            }
        };

        let outcome = process(&event.data, self.decryptor.as_ref()).inspect_err(|err| {
            warn!(error = %err, "dropping envelope with undecodable payload");
        })?;
        span.record("message_id", field::display(outcome.payload.message_id));

        self.sink.emit(&outcome);
        Ok(Ingested::Processed(outcome))
    }
}
