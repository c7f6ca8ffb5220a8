//! API client for communicating with the GoBarber REST API.
//!
//! This module provides the `RemoteAuthService` trait the session store
//! authenticates through, and the `ApiClient` struct that implements it
//! over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Serialize;
use tracing::{debug, warn};

use crate::models::AuthResponse;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL of the GoBarber API
pub const DEFAULT_API_URL: &str = "http://localhost:3333";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Exchanges credentials for a session.
#[async_trait]
pub trait RemoteAuthService: Send + Sync {
    /// Authenticate with email and password, returning the user and a
    /// bearer token.
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ResetPasswordRequest<'a> {
    password: &'a str,
    password_confirmation: &'a str,
    token: &'a str,
}

/// API client for the GoBarber backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client for the given base URL
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Ask the API to set a new password using the token from a reset link
    pub async fn reset_password(
        &self,
        password: &str,
        password_confirmation: &str,
        token: &str,
    ) -> Result<(), ApiError> {
        let url = self.url("password/reset");
        debug!(url = %url, "Requesting password reset");

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&ResetPasswordRequest {
                password,
                password_confirmation,
                token,
            })
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "API request failed");
            Err(ApiError::from_status(status, &body))
        }
    }
}

#[async_trait]
impl RemoteAuthService for ApiClient {
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let url = self.url("sessions");
        debug!(url = %url, "Sending authentication request");

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&SessionRequest { email, password })
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let body = response.text().await?;

        serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse auth response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("http://localhost:3333/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3333");
        assert_eq!(client.url("sessions"), "http://localhost:3333/sessions");
    }

    #[tokio::test]
    async fn test_authenticate_posts_credentials() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/sessions")
            .match_body(Matcher::Json(json!({
                "email": "johndoe@test.com",
                "password": "123456",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "user": {"id": "id-123", "name": "John Doe", "email": "johndoe@test.com"},
                    "token": "token-123",
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let auth = client
            .authenticate("johndoe@test.com", "123456")
            .await
            .expect("authentication should succeed");

        mock.assert_async().await;
        assert_eq!(auth.token, "token-123");
        assert_eq!(auth.user.name, "John Doe");
    }

    #[tokio::test]
    async fn test_authenticate_unauthorized() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/sessions")
            .with_status(401)
            .with_body(r#"{"status":"error","message":"Incorrect email/password combination."}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client
            .authenticate("johndoe@test.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn test_authenticate_malformed_body() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/sessions")
            .with_status(200)
            .with_body(r#"{"token":"token-123"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.authenticate("a@b.com", "x").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_reset_password() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/password/reset")
            .match_body(Matcher::Json(json!({
                "password": "new-secret",
                "password_confirmation": "new-secret",
                "token": "reset-token",
            })))
            .with_status(204)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        client
            .reset_password("new-secret", "new-secret", "reset-token")
            .await
            .expect("reset should succeed");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_reset_password_server_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/password/reset")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.reset_password("a", "a", "t").await.unwrap_err();
        assert!(matches!(err, ApiError::ServerError(ref body) if body == "boom"));
    }
}
