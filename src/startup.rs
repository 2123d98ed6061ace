//! Application startup and lifecycle management.

use crate::config::DiagnosisConfig;
use crate::handlers;
use crate::middleware::cors_middleware;
use crate::services::providers::gemini::{GeminiConfig, GeminiDiagnosisProvider};
use crate::services::providers::DiagnosisProvider;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Multipart buffering threshold: uploads beyond this are rejected by the
/// body-limit layer.
const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: DiagnosisConfig,
    pub provider: Arc<dyn DiagnosisProvider>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the Gemini provider.
    pub async fn build(config: DiagnosisConfig) -> Result<Self, anyhow::Error> {
        let gemini_config = GeminiConfig {
            api_key: config.google.api_key.clone(),
            model: config.model.clone(),
        };
        let provider: Arc<dyn DiagnosisProvider> =
            Arc::new(GeminiDiagnosisProvider::new(gemini_config));

        tracing::info!(model = %config.model, "Initialized Gemini diagnosis provider");

        Self::build_with_provider(config, provider).await
    }

    /// Build the application with an injected provider (used by tests).
    pub async fn build_with_provider(
        config: DiagnosisConfig,
        provider: Arc<dyn DiagnosisProvider>,
    ) -> Result<Self, anyhow::Error> {
        let state = AppState {
            config: config.clone(),
            provider,
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route("/analyze", post(handlers::analyze_image))
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
            .layer(middleware::from_fn(cors_middleware))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        // Port 0 binds a random port for testing.
        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            anyhow::Error::new(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
