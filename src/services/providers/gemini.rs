//! Gemini diagnosis provider.
//!
//! Sends the uploaded scan to Google's Gemini API as a single-turn request
//! with a fixed instruction and a structured-output JSON schema.

use super::{DiagnosisProvider, ProviderError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Gemini API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Fixed instruction sent with every scan.
const DIAGNOSIS_PROMPT: &str = "What is the disease visible in this OCT scan?";

/// MIME type tagged on the inline image. Hardcoded per the backend contract,
/// regardless of the upload's declared content type.
const IMAGE_MIME_TYPE: &str = "image/jpg";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

/// Gemini diagnosis provider.
pub struct GeminiDiagnosisProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiDiagnosisProvider {
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Build the API URL for the given method.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            GEMINI_API_BASE, self.config.model, method, self.config.api_key
        )
    }

    /// Build the single-turn request: instruction text, inline image bytes,
    /// and the response schema constraint.
    fn build_request(&self, image: &[u8]) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    ContentPart::Text {
                        text: DIAGNOSIS_PROMPT.to_string(),
                    },
                    ContentPart::InlineData {
                        inline_data: InlineData {
                            mime_type: IMAGE_MIME_TYPE.to_string(),
                            data: BASE64.encode(image),
                        },
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            }),
        }
    }
}

/// Schema hint constraining the model to the diagnosis report shape.
/// The model is expected to honor it; local enforcement happens when the
/// boundary parses the returned text.
fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "required": ["disease", "isOCTScan", "explanation"],
        "properties": {
            "disease": {
                "type": "STRING",
                "description": "type of the disease. can be AMD/DME/NORMAL."
            },
            "isOCTScan": {
                "type": "BOOLEAN",
                "description": "is this an OCT scan?"
            },
            "explanation": {
                "type": "STRING",
                "description": "why did you make this prediction?"
            }
        },
        "propertyOrdering": ["disease", "isOCTScan", "explanation"]
    })
}

#[async_trait]
impl DiagnosisProvider for GeminiDiagnosisProvider {
    async fn diagnose(&self, image: &[u8]) -> Result<String, ProviderError> {
        // Fail fast before any network I/O when the key is absent.
        if self.config.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Google AI API key not configured".to_string(),
            ));
        }

        let request = self.build_request(image);
        let url = self.api_url("generateContent");

        tracing::debug!(
            model = %self.config.model,
            image_bytes = image.len(),
            "Sending diagnosis request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        // First candidate, first text part. An empty reply is passed through
        // and surfaces as a parse failure at the boundary.
        let text = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| match p {
                ContentPart::Text { text } => Some(text),
                _ => None,
            })
            .unwrap_or_default();

        Ok(text)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Google AI API key not configured".to_string(),
            ));
        }

        // List models to verify the API key works.
        let url = format!("{}/models?key={}", GEMINI_API_BASE, self.config.api_key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::ApiError(format!(
                "Health check failed: {}",
                response.status()
            )))
        }
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GeminiDiagnosisProvider {
        GeminiDiagnosisProvider::new(GeminiConfig {
            api_key: "test-api-key".to_string(),
            model: "gemini-2.0-flash".to_string(),
        })
    }

    #[test]
    fn request_carries_prompt_then_inline_image() {
        let image = b"\xff\xd8\xff\xe0fake-jpeg";
        let request = provider().build_request(image);
        let value = serde_json::to_value(&request).expect("Failed to serialize request");

        let parts = &value["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], DIAGNOSIS_PROMPT);
        assert_eq!(parts[1]["inline_data"]["mimeType"], "image/jpg");
        assert_eq!(parts[1]["inline_data"]["data"], BASE64.encode(image));
        assert_eq!(value["contents"][0]["role"], "user");
    }

    #[test]
    fn request_constrains_output_to_report_schema() {
        let request = provider().build_request(b"scan");
        let value = serde_json::to_value(&request).expect("Failed to serialize request");

        let config = &value["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");

        let schema = &config["responseSchema"];
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(
            schema["required"],
            serde_json::json!(["disease", "isOCTScan", "explanation"])
        );
        assert_eq!(
            schema["propertyOrdering"],
            serde_json::json!(["disease", "isOCTScan", "explanation"])
        );
        assert_eq!(schema["properties"]["isOCTScan"]["type"], "BOOLEAN");
    }

    #[test]
    fn extracts_first_candidate_text() {
        let api_response: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"text": "{\"disease\":\"AMD\"}"}]
                    }
                }]
            }"#,
        )
        .expect("Failed to parse response");

        let text = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| match p {
                ContentPart::Text { text } => Some(text),
                _ => None,
            })
            .unwrap_or_default();

        assert_eq!(text, "{\"disease\":\"AMD\"}");
    }

    #[tokio::test]
    async fn diagnose_without_api_key_fails_before_network() {
        let provider = GeminiDiagnosisProvider::new(GeminiConfig {
            api_key: String::new(),
            model: "gemini-2.0-flash".to_string(),
        });

        let result = provider.diagnose(b"scan").await;
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }
}
