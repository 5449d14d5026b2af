pub mod gemini;
pub mod openai;

use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use crate::domain::llm_config::LLMProvider;
use async_trait::async_trait;
use gemini::GeminiClient;
use openai::OpenAIClient;
use url::Url;

#[async_trait]
pub trait LLMClient {
    /// Runs one completion. `image_url`, when given, must be absolute.
    async fn generate(
        &self,
        config: &LLMConfig,
        system: &str,
        user: &str,
        image_url: Option<&str>,
    ) -> Result<String>;
}

pub struct RouterClient {
    openai: OpenAIClient,
    gemini: GeminiClient,
}

impl RouterClient {
    pub fn new() -> Self {
        Self {
            openai: OpenAIClient::new(),
            gemini: GeminiClient::new(),
        }
    }
}

impl Default for RouterClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for RouterClient {
    async fn generate(
        &self,
        config: &LLMConfig,
        system: &str,
        user: &str,
        image_url: Option<&str>,
    ) -> Result<String> {
        match config.provider {
            LLMProvider::Google => self.gemini.generate(config, system, user, image_url).await,
            LLMProvider::OpenAI => self.openai.generate(config, system, user, image_url).await,
        }
    }
}

/// Makes an image reference absolute so the model provider can fetch it.
///
/// Absolute http(s) and data URLs pass through; relative paths are joined
/// onto `public_base_url`. Returns `None` when no usable URL results.
pub fn resolve_image_url(public_base_url: Option<&str>, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(url) = Url::parse(raw) {
        return matches!(url.scheme(), "http" | "https" | "data").then(|| url.to_string());
    }
    let base = Url::parse(public_base_url?.trim()).ok()?;
    base.join(raw).ok().map(|url| url.to_string())
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}
