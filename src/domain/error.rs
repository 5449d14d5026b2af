use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    NotFound(String),
    ValidationError(String),
    ParseError(String),
    LLMError(String),
    DatabaseError(String),
    ConfigError(String),
    Unauthorized(String),
    IoError(String),
}

impl AppError {
    /// Stable machine-readable code used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::ParseError(_) | AppError::LLMError(_) => "ANALYSIS_FAILED",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Internal(_)
            | AppError::DatabaseError(_)
            | AppError::ConfigError(_)
            | AppError::IoError(_) => "INTERNAL_ERROR",
        }
    }

    /// True for failures of the model provider or of its reply.
    pub fn is_upstream(&self) -> bool {
        matches!(self, AppError::LLMError(_) | AppError::ParseError(_))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AppError::LLMError(msg) => write!(f, "LLM error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_errors_share_the_analysis_code() {
        assert_eq!(AppError::LLMError("x".into()).code(), "ANALYSIS_FAILED");
        assert_eq!(AppError::ParseError("x".into()).code(), "ANALYSIS_FAILED");
        assert!(AppError::ParseError("x".into()).is_upstream());
        assert!(!AppError::DatabaseError("x".into()).is_upstream());
    }

    #[test]
    fn display_prefixes_kind() {
        let err = AppError::NotFound("case abc".to_string());
        assert_eq!(err.to_string(), "Not found: case abc");
    }
}
