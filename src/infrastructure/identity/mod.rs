use crate::domain::error::{AppError, Result};
use crate::domain::profile::Identity;
use async_trait::async_trait;
use serde::Deserialize;

pub const DEMO_USER_ID: &str = "demo-user-id";

/// Resolves a bearer token to the caller's identity.
#[async_trait]
pub trait IdentityProvider {
    async fn resolve(&self, token: Option<&str>) -> Result<Identity>;
}

/// Delegates to the hosted auth provider's `/auth/v1/user` endpoint.
pub struct RemoteIdentity {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct RemoteUser {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: RemoteUserMetadata,
}

#[derive(Deserialize, Default)]
struct RemoteUserMetadata {
    full_name: Option<String>,
    name: Option<String>,
}

impl RemoteIdentity {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentity {
    async fn resolve(&self, token: Option<&str>) -> Result<Identity> {
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;
        let url = format!("{}/auth/v1/user", self.base_url.trim_end_matches('/'));

        let mut request = self.client.get(&url).bearer_auth(token);
        if let Some(api_key) = &self.api_key {
            request = request.header("apikey", api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Auth provider request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AppError::Unauthorized("Session is invalid or expired".to_string()));
        }
        if !status.is_success() {
            return Err(AppError::Internal(format!("Auth provider error ({})", status)));
        }

        let user: RemoteUser = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse auth user: {}", e)))?;

        Ok(Identity {
            id: user.id,
            email: user.email,
            full_name: user.user_metadata.full_name.or(user.user_metadata.name),
            demo: false,
        })
    }
}

/// Fixed identity for demo mode; never touches the network.
pub struct DemoIdentity;

#[async_trait]
impl IdentityProvider for DemoIdentity {
    async fn resolve(&self, _token: Option<&str>) -> Result<Identity> {
        Ok(Identity {
            id: DEMO_USER_ID.to_string(),
            email: Some("demo@example.com".to_string()),
            full_name: Some("Demo User".to_string()),
            demo: true,
        })
    }
}

/// Extracts the token from an `Authorization: Bearer ...` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_identity_ignores_token() {
        let identity = DemoIdentity.resolve(None).await.unwrap();
        assert_eq!(identity.id, DEMO_USER_ID);
        assert!(identity.demo);
    }

    #[tokio::test]
    async fn remote_identity_requires_token() {
        let provider = RemoteIdentity::new("http://127.0.0.1:9", None);
        let err = provider.resolve(Some("  ")).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn parses_bearer_header() {
        assert_eq!(bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("bearer   abc ")), Some("abc"));
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(Some("Bearer")), None);
        assert_eq!(bearer_token(None), None);
    }
}
