use super::{endpoint, LLMClient};
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;
use serde_json::{json, Value};

/// OpenAI-compatible chat-completions client with vision input.
pub struct OpenAIClient {
    client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn api_key(config: &LLMConfig) -> Result<String> {
        config
            .api_key
            .clone()
            .ok_or_else(|| AppError::LLMError("Missing API key for OpenAI provider".to_string()))
    }

    fn request_body(config: &LLMConfig, system: &str, user: &str, image_url: Option<&str>) -> Value {
        let user_content = match image_url {
            Some(url) => json!([
                { "type": "text", "text": user },
                { "type": "image_url", "image_url": { "url": url } }
            ]),
            None => json!(user),
        };

        json!({
            "model": config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user_content }
            ],
            "response_format": { "type": "json_object" },
            "max_tokens": config.max_tokens,
            "temperature": config.temperature,
        })
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate(
        &self,
        config: &LLMConfig,
        system: &str,
        user: &str,
        image_url: Option<&str>,
    ) -> Result<String> {
        let api_key = Self::api_key(config)?;
        let url = endpoint(&config.base_url, "chat/completions");
        let body = Self::request_body(config, system, user, image_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
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

        let json: Value = response
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::LLMError("Invalid response format".to_string()))
    }
}
