use serde::Deserialize;
use std::env;

/// Default Gemini model for diagnosis requests.
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Read-only configuration snapshot, loaded once at startup and injected
/// into handler state. Handlers and providers never read the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosisConfig {
    pub port: u16,
    pub google: GoogleConfig,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub api_key: String,
}

impl DiagnosisConfig {
    pub fn load() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let port = match env::var("PORT") {
            Ok(val) => val
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT is not a valid port number: {}", e))?,
            Err(_) => 8080,
        };

        // An absent key is not a startup error: the service must still serve
        // /health, and /analyze reports the misconfiguration per request.
        let api_key = env::var("GOOGLEAI_API_KEY").unwrap_or_default();

        Ok(DiagnosisConfig {
            port,
            google: GoogleConfig { api_key },
            model: env::var("DIAGNOSIS_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: the cases mutate process-wide env vars and must not run
    // concurrently with each other.
    #[test]
    fn load_reads_environment() {
        std::env::remove_var("PORT");
        std::env::remove_var("GOOGLEAI_API_KEY");
        std::env::remove_var("DIAGNOSIS_MODEL");

        let config = DiagnosisConfig::load().expect("Failed to load config");
        assert_eq!(config.port, 8080);
        assert!(config.google.api_key.is_empty());
        assert_eq!(config.model, "gemini-2.0-flash");

        std::env::set_var("PORT", "not-a-port");
        assert!(DiagnosisConfig::load().is_err());
        std::env::remove_var("PORT");
    }
}
