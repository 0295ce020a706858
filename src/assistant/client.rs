use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::config::AssistantConfig;

/// One text-generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub prompt: String,
    pub temperature: f32,
}

/// External text-generation service.
///
/// `Ok(None)` means the service answered but produced no text.
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: ContentBody<'a>,
    contents: Vec<ContentBody<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct ContentBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Google Gemini `generateContent` over REST
#[derive(Clone)]
pub struct GeminiClient {
    endpoint: String,
    model: String,
    api_key_vars: Vec<String>,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &AssistantConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key_vars: config.api_key_vars(),
            client,
        })
    }

    /// The key is looked up on every call so it can be exported after start
    fn api_key(&self) -> Result<String> {
        self.api_key_vars
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
            .ok_or_else(|| anyhow!("API key not found (checked {})", self.api_key_vars.join(", ")))
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl AnswerService for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>> {
        let api_key = self.api_key()?;

        let body = GenerateContentRequest {
            system_instruction: ContentBody {
                role: None,
                parts: vec![TextPart {
                    text: &request.system_instruction,
                }],
            },
            contents: vec![ContentBody {
                role: Some("user"),
                parts: vec![TextPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        };

        debug!(target: "assistant", "POST {} ({} prompt bytes)", self.url(), request.prompt.len());

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("Gemini API error {}: {}", status, error_text);
        }

        let result: GenerateContentResponse = response.json().await?;
        Ok(result.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            system_instruction: ContentBody {
                role: None,
                parts: vec![TextPart { text: "sys" }],
            },
            contents: vec![ContentBody {
                role: Some("user"),
                parts: vec![TextPart { text: "hello" }],
            }],
            generation_config: GenerationConfig { temperature: 0.4 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert!((json["generationConfig"]["temperature"].as_f64().unwrap() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_response_text_joins_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Так, "},{"text":"є притулок."}],"role":"model"}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.text().as_deref(), Some("Так, є притулок."));
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.text(), None);
    }
}
