//! Application execution logic.
//!
//! This module builds the maintenance gate from the validated config and
//! serves a demo application behind it until a shutdown signal arrives.

use std::convert::Infallible;
use std::future::{Ready, ready};
use std::net::SocketAddr;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tower::{Layer, Service};

use maintenance_gate::config::ValidatedConfig;
use maintenance_gate::control::MaintenanceSwitch;
use maintenance_gate::gate::{MaintenanceGate, StartupError};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The gate could not be constructed.
    #[error(transparent)]
    Startup(#[from] StartupError),

    /// Failed to bind the listen address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Address that could not be bound
        addr: SocketAddr,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the options.
    #[error("Failed to serialize options: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Demo application answering 200 for every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoApp;

impl<B> Service<Request<B>> for DemoApp {
    type Response = Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let body = format!("Application response for {}\n", req.uri().path());
        ready(Ok(Response::new(Full::new(Bytes::from(body)))))
    }
}

/// Builds the gate from the configuration.
///
/// The gate is controlled by an in-memory switch that starts in the
/// configured state.
///
/// # Errors
///
/// Returns an error if the options are invalid or the response cannot be
/// resolved.
pub fn build_gate(config: &ValidatedConfig) -> Result<MaintenanceGate, RunError> {
    let switch = Arc::new(MaintenanceSwitch::new(config.enabled));
    let gate = MaintenanceGate::new(switch, &config.hosting, &config.options)?;
    Ok(gate)
}

/// Serves the demo application behind the gate.
///
/// This function:
/// 1. Builds the gate (options, response, state restore)
/// 2. Binds the listen address
/// 3. Accepts connections until shutdown signal (Ctrl+C)
///
/// # Errors
///
/// Returns an error if:
/// - The gate cannot be constructed
/// - The listen address cannot be bound
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires a real
/// socket and signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let layer = build_gate(&config)?.into_layer();

    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|source| RunError::Bind {
            addr: config.listen,
            source,
        })?;

    tracing::info!(
        "Listening on http://{} (maintenance {})",
        config.listen,
        if config.enabled { "on" } else { "off" }
    );

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                tracing::info!("Shutdown signal received, stopping...");
                return Ok(());
            }

            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        let io = TokioIo::new(stream);
                        let service = TowerToHyperService::new(layer.layer(DemoApp));

                        tokio::spawn(async move {
                            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                                tracing::debug!(%peer, "Connection ended: {e}");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {e}");
                    }
                }
            }
        }
    }
}

/// Returns a future that completes when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
