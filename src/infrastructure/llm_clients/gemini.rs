use super::LLMClient;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Gemini `generateContent` client. Images are fetched and sent inline.
pub struct GeminiClient {
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn api_key(config: &LLMConfig) -> Result<String> {
        config
            .api_key
            .clone()
            .ok_or_else(|| AppError::LLMError("Missing API key for Google provider".to_string()))
    }

    async fn fetch_image(&self, image_url: &str) -> Result<InlineData> {
        let response = self
            .client
            .get(image_url)
            .send()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to download image: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::LLMError(format!(
                "Failed to download image ({})",
                response.status()
            )));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or(DEFAULT_IMAGE_MIME)
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to read image: {}", e)))?;

        Ok(InlineData {
            mime_type,
            data: BASE64.encode(&bytes),
        })
    }

    fn build_request(
        config: &LLMConfig,
        system: &str,
        user: &str,
        image: Option<InlineData>,
    ) -> GeminiRequest {
        let mut parts = Vec::new();
        if !system.trim().is_empty() {
            parts.push(GeminiPart::Text {
                text: system.to_string(),
            });
        }
        if let Some(inline_data) = image {
            parts.push(GeminiPart::Inline { inline_data });
        }
        if !user.trim().is_empty() {
            parts.push(GeminiPart::Text {
                text: user.to_string(),
            });
        }

        GeminiRequest {
            contents: vec![GeminiContent { parts, role: None }],
            generation_config: Some(GenerationConfig {
                temperature: config.temperature.unwrap_or(0.3) as f64,
                max_output_tokens: config.max_tokens,
                response_mime_type: "application/json".to_string(),
            }),
        }
    }
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn generate(
        &self,
        config: &LLMConfig,
        system: &str,
        user: &str,
        image_url: Option<&str>,
    ) -> Result<String> {
        let api_key = Self::api_key(config)?;
        let model_id = config.model.trim();
        let base_url = config.base_url.trim_end_matches('/');
        let url = format!("{}/{}:generateContent?key={}", base_url, model_id, api_key);

        let image = match image_url {
            Some(image_url) => Some(self.fetch_image(image_url).await?),
            None => None,
        };
        let body = Self::build_request(config, system, user, image);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LLMError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLMError(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let json: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))?;

        json.candidates
            .first()
            .and_then(|candidate| candidate.content.parts.iter().find_map(|p| p.text.clone()))
            .ok_or_else(|| AppError::LLMError("Invalid response format".to_string()))
    }
}
