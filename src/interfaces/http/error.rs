use crate::domain::error::AppError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use tracing::error;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::LLMError(_) | AppError::ParseError(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_)
            | AppError::DatabaseError(_)
            | AppError::ConfigError(_)
            | AppError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg) => msg.clone(),
            _ if self.is_upstream() => {
                error!(error = %self, "Analysis failed");
                "Analysis failed. Please try again.".to_string()
            }
            _ => {
                error!(error = %self, "Request failed");
                "Something went wrong. Please try again.".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message,
            },
        })
    }
}
