//! Logging and optional OTLP span export shared by smshook binaries.

use anyhow::Result;

mod config;
mod tracing_init;

pub use config::{OtlpProtocol, TelemetryConfig};
pub use tracing_init::{init_telemetry, shutdown_telemetry};

/// Installs the subscriber configured from `RUST_LOG`, `LOG_FORMAT` and the
/// `OTEL_*` variables. The version is the calling binary's own.
pub fn install(service_name: &str, service_version: &str) -> Result<()> {
    init_telemetry(TelemetryConfig::from_env(service_name, service_version))
}
