use crate::domain::case::NewCase;
use crate::domain::error::{AppError, Result};
use crate::domain::question::Question;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Client view of the three-step diagnosis endpoints.
#[async_trait]
pub trait DiagnoseApi {
    async fn create_case(&self, input: &NewCase) -> Result<String>;

    async fn get_questions(&self, case_id: &str) -> Result<Vec<Question>>;

    /// Returns the cards exactly as received, before normalization.
    async fn submit_results(
        &self,
        case_id: &str,
        answers: Option<&Map<String, Value>>,
    ) -> Result<Value>;
}

pub struct HttpDiagnoseClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCaseReply {
    case_id: String,
}

#[derive(Deserialize)]
struct QuestionsReply {
    #[serde(default)]
    questions: Value,
}

#[derive(Deserialize)]
struct ErrorReply {
    error: ErrorReplyDetail,
}

#[derive(Deserialize)]
struct ErrorReplyDetail {
    message: String,
}

impl HttpDiagnoseClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/diagnose/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, &body));
        }
        response
            .json()
            .await
            .map_err(|e| AppError::ParseError(format!("Failed to parse response: {}", e)))
    }
}

/// Maps an error status and `{error: {code, message}}` body onto `AppError`.
fn error_for_status(status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<ErrorReply>(body)
        .map(|reply| reply.error.message)
        .unwrap_or_else(|_| format!("HTTP {}", status));
    debug!(status = %status, message = %message, "Diagnose API error");
    match status {
        StatusCode::BAD_REQUEST => AppError::ValidationError(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::BAD_GATEWAY => AppError::LLMError(message),
        _ => AppError::Internal(message),
    }
}

fn transport_error(err: reqwest::Error) -> AppError {
    AppError::Internal(format!("Request failed: {}", err))
}

#[async_trait]
impl DiagnoseApi for HttpDiagnoseClient {
    async fn create_case(&self, input: &NewCase) -> Result<String> {
        let response = self
            .client
            .post(self.url("cases"))
            .json(input)
            .send()
            .await
            .map_err(transport_error)?;
        let reply: CreateCaseReply = Self::read_json(response).await?;
        Ok(reply.case_id)
    }

    async fn get_questions(&self, case_id: &str) -> Result<Vec<Question>> {
        let response = self
            .client
            .get(self.url(&format!("questions/{}", case_id)))
            .send()
            .await
            .map_err(transport_error)?;
        let reply: QuestionsReply = Self::read_json(response).await?;
        Ok(Question::from_model_value(&reply.questions))
    }

    async fn submit_results(
        &self,
        case_id: &str,
        answers: Option<&Map<String, Value>>,
    ) -> Result<Value> {
        let mut body = json!({ "caseId": case_id });
        if let Some(answers) = answers {
            body["answers"] = Value::Object(answers.clone());
        }
        let response = self
            .client
            .post(self.url("results"))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let mut reply: Value = Self::read_json(response).await?;
        if let Some(cards) = reply.get_mut("cards") {
            return Ok(cards.take());
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_error_statuses() {
        let body = r#"{"error":{"code":"VALIDATION_ERROR","message":"symptoms: required"}}"#;
        assert_eq!(
            error_for_status(StatusCode::BAD_REQUEST, body),
            AppError::ValidationError("symptoms: required".to_string())
        );
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, "{}"),
            AppError::NotFound(_)
        ));
        let upstream = error_for_status(StatusCode::BAD_GATEWAY, "gateway down");
        assert_eq!(upstream, AppError::LLMError("HTTP 502 Bad Gateway".to_string()));
        assert!(upstream.is_upstream());

        let internal = error_for_status(StatusCode::INTERNAL_SERVER_ERROR, "{}");
        assert!(matches!(internal, AppError::Internal(_)));
        assert!(!internal.is_upstream());
    }

    #[tokio::test]
    async fn unreachable_server_is_not_a_model_error() {
        let client = HttpDiagnoseClient::new("http://127.0.0.1:1");
        let err = client
            .create_case(&NewCase::new("limping", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(!err.is_upstream());
    }

    #[test]
    fn builds_endpoint_urls() {
        let client = HttpDiagnoseClient::new("http://localhost:5000/");
        assert_eq!(
            client.url("questions/abc"),
            "http://localhost:5000/api/diagnose/questions/abc"
        );
    }
}
