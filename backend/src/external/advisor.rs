//! Gemini Advisor Client
//!
//! Client for the Google Gemini generateContent API used by the AI advisor.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::AdvisorConfig;
use crate::error::{AppError, AppResult};

/// Client for the Gemini generative language API
#[derive(Clone)]
pub struct GeminiClient {
    api_endpoint: String,
    api_key: String,
    model: String,
    http_client: Client,
}

/// Request body for the generateContent endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// A single conversation turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// Generation parameters for structured output
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: serde_json::Value,
}

/// Response body from the generateContent endpoint
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl Content {
    /// Build a single-part conversation turn
    pub fn text(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![Part { text: text.into() }],
        }
    }
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if any
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        if content.parts.is_empty() {
            return None;
        }
        Some(content.parts.iter().map(|p| p.text.as_str()).collect())
    }
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(api_endpoint: String, api_key: String, model: String) -> Self {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_endpoint,
            api_key,
            model,
            http_client,
        }
    }

    /// Create a client from the advisor configuration
    ///
    /// Returns `None` when no API key is configured so the advisor
    /// endpoints can degrade gracefully instead of failing requests.
    pub fn from_config(config: &AdvisorConfig) -> Option<Self> {
        if config.api_key.is_empty() {
            return None;
        }

        Some(Self::new(
            config.api_endpoint.clone(),
            config.api_key.clone(),
            config.model.clone(),
        ))
    }

    /// Generate a free-form text response
    pub async fn generate(&self, contents: Vec<Content>) -> AppResult<String> {
        let request = GenerateContentRequest {
            contents,
            system_instruction: None,
            generation_config: None,
        };

        self.send(&request).await
    }

    /// Generate a free-form text response steered by a system instruction
    pub async fn generate_with_system(
        &self,
        system_instruction: &str,
        contents: Vec<Content>,
    ) -> AppResult<String> {
        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part {
                    text: system_instruction.to_string(),
                }],
            }),
            generation_config: None,
        };

        self.send(&request).await
    }

    /// Generate a response constrained to a JSON schema
    pub async fn generate_json(
        &self,
        contents: Vec<Content>,
        response_schema: serde_json::Value,
    ) -> AppResult<String> {
        let request = GenerateContentRequest {
            contents,
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema,
            }),
        };

        self.send(&request).await
    }

    async fn send(&self, request: &GenerateContentRequest) -> AppResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_endpoint, self.model
        );

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::AdvisorError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::AdvisorError(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::AdvisorError(format!("Failed to parse response: {}", e)))?;

        result
            .text()
            .ok_or_else(|| AppError::AdvisorError("Empty response from model".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_extraction() {
        let json = r#"{
            "candidates": [
                {
                    "content": {
                        "role": "model",
                        "parts": [{"text": "Xin "}, {"text": "chào"}]
                    }
                }
            ]
        }"#;

        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().as_deref(), Some("Xin chào"));
    }

    #[test]
    fn test_empty_response_has_no_text() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let mut config = AdvisorConfig {
            api_endpoint: "https://generativelanguage.googleapis.com".to_string(),
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
        };
        assert!(GeminiClient::from_config(&config).is_none());

        config.api_key = "test-key".to_string();
        assert!(GeminiClient::from_config(&config).is_some());
    }

    #[test]
    fn test_request_serialization_uses_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content::text("user", "hello")],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: serde_json::json!({"type": "OBJECT"}),
            }),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"responseMimeType\""));
        assert!(json.contains("\"responseSchema\""));
        assert!(!json.contains("systemInstruction"));
    }
}
