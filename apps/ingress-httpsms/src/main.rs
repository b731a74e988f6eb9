use anyhow::Result;
use smshook_ingress::{IngressConfig, run};
use smshook_telemetry::{install as init_telemetry, shutdown_telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry("smshook-ingress", env!("CARGO_PKG_VERSION"))?;
    let config = IngressConfig::from_env()?;
    tracing::debug!(?config, "loaded configuration");
    let result = run(config).await;
    shutdown_telemetry();
    result
}
