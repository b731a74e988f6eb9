//! smshook core contracts and value types.
//!
//! This crate owns the narrow part of the receiver that makes decisions: admitting
//! CloudEvents-style envelopes against the known event taxonomy, decoding the
//! `message.phone.received` payload, and resolving its body through an injected
//! decrypt capability. Transport, authorization, and the cipher itself live in
//! sibling crates.
pub mod envelope;
pub mod error;
pub mod outcome;
pub mod payload;
pub mod pipeline;
pub mod processor;
pub mod sink;

pub use envelope::*;
pub use error::*;
pub use outcome::*;
pub use payload::*;
pub use pipeline::*;
pub use processor::*;
pub use sink::*;
