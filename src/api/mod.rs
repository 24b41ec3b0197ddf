//! HTTP API server for the relay

pub mod health;
pub mod webhooks;

use std::sync::Arc;

use axum::Router;
use secrecy::SecretString;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::relay::Dispatcher;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub dispatcher: Arc<Dispatcher>,
    /// Channel secret used to verify webhook signatures
    pub channel_secret: SecretString,
}

impl ApiState {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>, channel_secret: SecretString) -> Self {
        Self {
            dispatcher,
            channel_secret,
        }
    }

    /// Whether voice messages get transcribed
    #[must_use]
    pub fn transcription_enabled(&self) -> bool {
        self.dispatcher.transcription_enabled()
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    #[must_use]
    pub fn new(state: ApiState, port: u16) -> Self {
        Self {
            state: Arc::new(state),
            port,
        }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        Router::new()
            .merge(webhooks::router(self.state.clone()))
            .merge(health::router(self.state.clone()))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the API server until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the port cannot be bound or the server fails
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr).await.inspect_err(|e| {
            tracing::error!(addr = %addr, error = %e, "failed to bind API server");
        })?;

        tracing::info!(
            port = self.port,
            transcription = self.state.transcription_enabled(),
            "API server listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        // Without a signal handler the server runs until killed
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
