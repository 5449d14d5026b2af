use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_CONFIG_FILE: &str = "dogtor.toml";
const ENV_PREFIX: &str = "DOGTOR_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Allowed browser origins; `*` allows any.
    pub cors_origins: Vec<String>,
    pub log_level: String,
    /// Base URL used to make relative image references absolute.
    pub public_base_url: Option<String>,
    pub llm: LLMConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Base URL of the external auth provider.
    pub provider_url: Option<String>,
    pub api_key: Option<String>,
    /// Serve the fixed demo identity instead of calling the provider.
    pub demo_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_url: "sqlite://dogtor.db".to_string(),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:5000".to_string(),
                "https://hellodogtor.com".to_string(),
            ],
            log_level: "info".to_string(),
            public_base_url: None,
            llm: LLMConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, then `dogtor.toml` (or `$DOGTOR_CONFIG`), then `DOGTOR_*` env vars.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let file = std::env::var("DOGTOR_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut config = Self::from_figment(figment)?;
        if config.llm.api_key.is_none() {
            config.llm.api_key = std::env::var(config.llm.api_key_env())
                .ok()
                .filter(|key| !key.trim().is_empty());
        }
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        figment
            .extract()
            .map_err(|e| AppError::ConfigError(format!("Invalid configuration: {}", e)))
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin.trim() == "*")
    }
}
