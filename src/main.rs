use oct_diagnosis_service::config::DiagnosisConfig;
use oct_diagnosis_service::observability::init_tracing;
use oct_diagnosis_service::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_tracing("info");

    tracing::info!(
        service = "oct-diagnosis-service",
        version = env!("CARGO_PKG_VERSION"),
        "Starting"
    );

    let config = DiagnosisConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
