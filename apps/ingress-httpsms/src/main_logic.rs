use std::sync::Arc;

use anyhow::Result;
use axum::serve;
use smshook_core::{Pipeline, TracingSink};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{info, warn};

use crate::config::IngressConfig;
use crate::http::{AppState, build_router};

/// Pipeline wired with the configured cipher and a tracing sink.
pub fn build_pipeline(config: &IngressConfig) -> Pipeline {
    let sink = TracingSink::new(config.ciphertext_logging());
    Pipeline::new(config.cipher.build(), Arc::new(sink))
}

/// Starts the webhook server and blocks until shutdown.
pub async fn run(config: IngressConfig) -> Result<()> {
    let state = AppState {
        pipeline: build_pipeline(&config),
    };
    let router = build_router(state, config.auth_policy());
    let listener = TcpListener::bind(config.addr).await?;
    info!("smshook-ingress listening on {}", config.addr);

    let stop = Arc::new(Notify::new());
    let stopped = stop.clone();
    let server = serve(listener, router).with_graceful_shutdown(async move {
        stopped.notified().await;
    });
    let mut server = tokio::spawn(async move { server.await });

    tokio::select! {
        joined = &mut server => return Ok(joined??),
        _ = shutdown_signal() => {}
    }

    info!(
        grace_secs = config.shutdown_grace.as_secs(),
        "shutdown requested; draining in-flight requests"
    );
    stop.notify_one();
    match tokio::time::timeout(config.shutdown_grace, server).await {
        Ok(joined) => joined??,
        Err(_) => warn!("in-flight requests did not finish within the grace period"),
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                warn!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
