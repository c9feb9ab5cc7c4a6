//! Hosted auth service seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// The service refused the request; message is the service's own
    #[error("{0}")]
    Rejected(String),

    #[error("Auth session missing!")]
    MissingSession,

    #[error("Auth service unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tokens returned by a successful sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: u64,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Send a recovery email whose link lands on `redirect_to`
    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), AuthError>;

    async fn update_password(&self, access_token: &str, password: &str) -> Result<(), AuthError>;
}
