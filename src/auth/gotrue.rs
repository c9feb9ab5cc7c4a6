//! Client for the hosted auth service (GoTrue-compatible REST API)

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::{AuthError, AuthProvider, AuthSession};

/// Error body shapes the service uses across endpoints
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

pub struct GoTrueProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoTrueProvider {
    /// `base_url` is the auth API root, e.g. `https://project.example.co/auth/v1`
    pub fn new(base_url: &str, api_key: &str, timeout_ms: u64) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| AuthError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AuthError> {
        let response = request
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body: ErrorBody = response.json().await.unwrap_or_default();
        debug!(status = %status, "Auth service rejected request");

        Err(match (status, body.into_message()) {
            (StatusCode::UNAUTHORIZED, None) => AuthError::MissingSession,
            (_, Some(message)) => AuthError::Rejected(message),
            (status, None) => AuthError::Rejected(format!("Auth service returned {}", status)),
        })
    }
}

#[async_trait]
impl AuthProvider for GoTrueProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let request = self
            .request(reqwest::Method::POST, "/token?grant_type=password")
            .json(&json!({ "email": email, "password": password }));

        let response = match self.send(request).await {
            Err(AuthError::Rejected(msg)) if msg == "Invalid login credentials" => {
                return Err(AuthError::InvalidCredentials)
            }
            other => other?,
        };

        response
            .json::<AuthSession>()
            .await
            .map_err(|e| AuthError::Internal(format!("Malformed session response: {}", e)))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let request = self
            .request(reqwest::Method::POST, "/logout")
            .bearer_auth(access_token);
        self.send(request).await.map(|_| ())
    }

    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        let path = format!("/recover?redirect_to={}", urlencoding::encode(redirect_to));
        let request = self
            .request(reqwest::Method::POST, &path)
            .json(&json!({ "email": email }));
        self.send(request).await.map(|_| ())
    }

    async fn update_password(&self, access_token: &str, password: &str) -> Result<(), AuthError> {
        let request = self
            .request(reqwest::Method::PUT, "/user")
            .bearer_auth(access_token)
            .json(&json!({ "password": password }));
        match self.send(request).await {
            Ok(_) => Ok(()),
            Err(err) => {
                warn!("Password update rejected: {}", err);
                Err(err)
            }
        }
    }
}
