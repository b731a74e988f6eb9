use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use serde_json::json;
use smshook_core::{
    APPLICATION_JSON, DecryptError, Decryptor, EVENT_TYPE_MESSAGE_PHONE_RECEIVED, Envelope,
    IgnoreReason, Ingested, OutcomeSink, Pipeline, ProcessingOutcome,
};

#[derive(Default)]
struct RecordingSink {
    seen: Mutex<Vec<ProcessingOutcome>>,
}

impl OutcomeSink for RecordingSink {
    fn emit(&self, outcome: &ProcessingOutcome) {
        self.seen.lock().unwrap().push(outcome.clone());
    }
}

struct MapDecryptor {
    calls: AtomicUsize,
    result: Result<String, DecryptError>,
}

impl MapDecryptor {
    fn new(result: Result<String, DecryptError>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            result,
        })
    }
}

impl Decryptor for MapDecryptor {
    fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(ciphertext, "ciphertextXYZ");
        self.result.clone()
    }
}

fn envelope(event_type: &str, content: &str, encrypted: bool) -> Envelope {
    let data = json!({
        "message_id": "0b9f6c1e-3d2a-4f5b-8e7c-6a1d2b3c4e5f",
        "user_id": "user-42",
        "owner": "+18005550100",
        "contact": "+18005550123",
        "timestamp": "2024-02-29T23:59:59+01:00",
        "content": content,
        "encrypted": encrypted,
        "sim": "SIM1"
    });
    Envelope::new(event_type, APPLICATION_JSON, serde_json::to_vec(&data).unwrap())
        .with_id("evt-1")
}

fn pipeline(decryptor: Arc<MapDecryptor>) -> (Pipeline, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    (Pipeline::new(decryptor, sink.clone()), sink)
}

#[test]
fn scenario_a_other_event_is_ignored_without_sink_call() {
    let decryptor = MapDecryptor::new(Ok("unused".into()));
    let (pipeline, sink) = pipeline(decryptor.clone());

    let result = pipeline
        .ingest(&envelope("other.event", "hello", false))
        .unwrap();

    assert_eq!(result, Ingested::Ignored(IgnoreReason::UnknownEventType));
    assert!(sink.seen.lock().unwrap().is_empty());
    assert_eq!(decryptor.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn scenario_b_plaintext_passes_through() {
    let decryptor = MapDecryptor::new(Ok("unused".into()));
    let (pipeline, sink) = pipeline(decryptor.clone());

    pipeline
        .ingest(&envelope(EVENT_TYPE_MESSAGE_PHONE_RECEIVED, "hello", false))
        .unwrap();

    let seen = sink.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].resolved_content(), "hello");
    assert!(seen[0].content_is_plaintext());
    assert!(seen[0].decrypt_error().is_none());
    assert_eq!(decryptor.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn scenario_c_encrypted_content_is_decrypted() {
    let decryptor = MapDecryptor::new(Ok("hi there".into()));
    let (pipeline, sink) = pipeline(decryptor.clone());

    let result = pipeline
        .ingest(&envelope(EVENT_TYPE_MESSAGE_PHONE_RECEIVED, "ciphertextXYZ", true))
        .unwrap();

    let Ingested::Processed(outcome) = result else {
        panic!("expected processed outcome");
    };
    assert_eq!(outcome.resolved_content(), "hi there");
    assert!(outcome.content_is_plaintext());
    assert_eq!(sink.seen.lock().unwrap().len(), 1);
    assert_eq!(decryptor.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn scenario_d_decrypt_failure_degrades_to_ciphertext() {
    let decryptor = MapDecryptor::new(Err(DecryptError::Failed("bad key".into())));
    let (pipeline, sink) = pipeline(decryptor);

    pipeline
        .ingest(&envelope(EVENT_TYPE_MESSAGE_PHONE_RECEIVED, "ciphertextXYZ", true))
        .unwrap();

    let seen = sink.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].resolved_content(), "ciphertextXYZ");
    assert!(!seen[0].content_is_plaintext());
    let err = seen[0].decrypt_error().expect("decrypt error");
    assert!(!err.to_string().is_empty());
}

#[test]
fn malformed_payload_fails_without_emitting() {
    let decryptor = MapDecryptor::new(Ok("unused".into()));
    let (pipeline, sink) = pipeline(decryptor.clone());
    let env = Envelope::new(
        EVENT_TYPE_MESSAGE_PHONE_RECEIVED,
        APPLICATION_JSON,
        r#"{"content":"x","encrypted":"nope"}"#,
    );

    assert!(pipeline.ingest(&env).is_err());
    assert!(sink.seen.lock().unwrap().is_empty());
    assert_eq!(decryptor.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn non_json_encoding_is_ignored_even_with_valid_payload() {
    let decryptor = MapDecryptor::new(Ok("unused".into()));
    let (pipeline, sink) = pipeline(decryptor);
    let mut env = envelope(EVENT_TYPE_MESSAGE_PHONE_RECEIVED, "hello", false);
    env.content_encoding = Some("application/xml".into());

    assert_eq!(
        pipeline.ingest(&env).unwrap(),
        Ingested::Ignored(IgnoreReason::UnsupportedEncoding)
    );
    assert!(sink.seen.lock().unwrap().is_empty());
}

#[test]
fn concurrent_invocations_share_nothing() {
    let decryptor = MapDecryptor::new(Ok("hi there".into()));
    let (pipeline, sink) = pipeline(decryptor.clone());

    std::thread::scope(|scope| {
        for i in 0..8 {
            let pipeline = pipeline.clone();
            scope.spawn(move || {
                let encrypted = i % 2 == 0;
                let content = if encrypted { "ciphertextXYZ" } else { "plain" };
                pipeline
                    .ingest(&envelope(EVENT_TYPE_MESSAGE_PHONE_RECEIVED, content, encrypted))
                    .unwrap();
            });
        }
    });

    let seen = sink.seen.lock().unwrap();
    assert_eq!(seen.len(), 8);
    assert!(seen.iter().all(|outcome| outcome.content_is_plaintext()));
    assert_eq!(decryptor.calls.load(Ordering::SeqCst), 4);
}
