//! Sign-in, sign-out and password recovery

use std::sync::Arc;
use tracing::{info, warn};

use super::ActionResult;
use crate::auth::{AuthError, AuthProvider, AuthSession, CurrentUser};

/// Shortest password accepted by the update form
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Page the recovery link finally lands on
const RECOVERY_NEXT_PATH: &str = "/update-password";

pub struct AuthActions {
    provider: Arc<dyn AuthProvider>,
    site_url: String,
}

impl AuthActions {
    /// `site_url` is the public base URL used in recovery links
    pub fn new(provider: Arc<dyn AuthProvider>, site_url: impl Into<String>) -> Self {
        Self {
            provider,
            site_url: site_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Where the recovery email sends the user
    pub fn recovery_redirect(&self) -> String {
        format!("{}/auth/callback?next={}", self.site_url, RECOVERY_NEXT_PATH)
    }

    /// Returns the session, or the message to show under the login form
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, String> {
        match self.provider.sign_in(email.trim(), password).await {
            Ok(session) => {
                info!(user_id = %session.user.id, "Signed in");
                Ok(session)
            }
            Err(err) => {
                warn!(error = %err, "Sign-in failed");
                Err(err.to_string())
            }
        }
    }

    /// Always succeeds from the caller's side; provider errors are logged
    pub async fn sign_out(&self, user: &CurrentUser) -> ActionResult {
        if let Some(token) = user.access_token() {
            if let Err(err) = self.provider.sign_out(token).await {
                warn!(error = %err, "Sign-out call failed");
            }
        }
        ActionResult::Success
    }

    pub async fn send_password_reset(&self, email: &str) -> ActionResult {
        let email = email.trim();
        if email.is_empty() {
            return ActionResult::failure("Email is required");
        }

        match self
            .provider
            .send_password_reset(email, &self.recovery_redirect())
            .await
        {
            Ok(()) => ActionResult::Success,
            Err(err) => {
                warn!(error = %err, "Password reset request failed");
                ActionResult::failure(err.to_string())
            }
        }
    }

    pub async fn update_password(&self, user: &CurrentUser, password: &str) -> ActionResult {
        let Some(token) = user.access_token() else {
            return ActionResult::failure(AuthError::MissingSession.to_string());
        };
        if password.chars().count() < PASSWORD_MIN_LENGTH {
            return ActionResult::failure(format!(
                "Password must be at least {} characters",
                PASSWORD_MIN_LENGTH
            ));
        }

        match self.provider.update_password(token, password).await {
            Ok(()) => {
                info!("Password updated");
                ActionResult::Success
            }
            Err(err) => ActionResult::failure(err.to_string()),
        }
    }
}
