//! API server lifecycle: bind, serve, shut down gracefully.
//!
//! bind → spawn background task → return handle with shutdown channel.
//! `serve` wraps that for the binary and stops on Ctrl-C.

use std::net::SocketAddr;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::api_router;
use crate::api::types::ApiContext;
use crate::config::ConfigError;
use crate::pipeline::analyzer::AnalyzerSetupError;

// ═══════════════════════════════════════════════════════════
// Public types
// ═══════════════════════════════════════════════════════════

/// Anything that stops the service from coming up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline setup failed: {0}")]
    Analyzer(#[from] AnalyzerSetupError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Async runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Handle to a running API server.
pub struct ApiServer {
    pub local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ApiServer {
    /// Signal a graceful shutdown. In-flight requests are allowed to finish.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }

    /// Wait for the server task to exit.
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "API server task failed");
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Server lifecycle
// ═══════════════════════════════════════════════════════════

/// Bind `addr` and serve the API in a background task.
pub async fn start_server(addr: SocketAddr, ctx: ApiContext) -> Result<ApiServer, StartupError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;
    let local_addr = listener.local_addr()?;

    let app = api_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(addr = %local_addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        local_addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

/// Serve until Ctrl-C, then shut down gracefully.
pub async fn serve(addr: SocketAddr, ctx: ApiContext) -> Result<(), StartupError> {
    let mut server = start_server(addr, ctx).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Cannot listen for Ctrl-C, shutting down");
    }

    server.shutdown();
    server.wait().await;
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::pipeline::analyzer::ExpenseAnalyzer;
    use crate::pipeline::extraction::MockOcrEngine;
    use crate::pipeline::gst_registry::OfflineRegistry;

    fn test_ctx() -> ApiContext {
        let analyzer = ExpenseAnalyzer::new(
            Arc::new(MockOcrEngine::new("Total Amount 100.00")),
            Arc::new(OfflineRegistry),
        );
        ApiContext::new(Arc::new(analyzer))
    }

    fn loopback() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let mut server = start_server(loopback(), test_ctx()).await.unwrap();
        assert_ne!(server.local_addr.port(), 0);

        server.shutdown();
        server.wait().await;
    }

    #[tokio::test]
    async fn server_serves_api_routes() {
        let mut server = start_server(loopback(), test_ctx()).await.unwrap();

        let url = format!("http://{}/api/health", server.local_addr);
        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.status(), 200);
        let json: serde_json::Value = response.json().await.unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["gstRegistry"], "offline");

        server.shutdown();
        server.wait().await;
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let mut server = start_server(loopback(), test_ctx()).await.unwrap();
        server.shutdown();
        server.shutdown();
        server.wait().await;
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let mut first = start_server(loopback(), test_ctx()).await.unwrap();
        let err = start_server(first.local_addr, test_ctx()).await.err().unwrap();
        assert!(matches!(err, StartupError::Bind { .. }));

        first.shutdown();
        first.wait().await;
    }
}
