use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum LLMProvider {
    /// Any OpenAI-compatible chat-completions endpoint.
    OpenAI,
    Google,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LLMConfig {
    pub provider: LLMProvider,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LLMConfig {
    /// Name of the conventional environment variable holding this provider's key.
    pub fn api_key_env(&self) -> &'static str {
        match self.provider {
            LLMProvider::OpenAI => "OPENAI_API_KEY",
            LLMProvider::Google => "GEMINI_API_KEY",
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::OpenAI,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
            max_tokens: Some(1500),
            temperature: Some(0.3),
        }
    }
}
