//! In-process auth provider for dev mode
//!
//! Accounts live in memory with Argon2 password hashes. Sessions are JWTs
//! signed by the same validator the request path uses. Recovery emails are
//! logged instead of sent.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use super::{
    hash_password, verify_password, AuthError, AuthProvider, AuthSession, AuthUser,
    JwtValidator, TokenInput,
};

struct LocalAccount {
    id: String,
    password_hash: String,
}

pub struct LocalAuthProvider {
    jwt: JwtValidator,
    accounts: DashMap<String, LocalAccount>,
}

impl LocalAuthProvider {
    pub fn new(jwt: JwtValidator) -> Self {
        Self {
            jwt,
            accounts: DashMap::new(),
        }
    }

    /// Register an account, returning its id
    pub fn add_account(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let id = Uuid::new_v4().to_string();
        self.accounts.insert(
            email.to_string(),
            LocalAccount {
                id: id.clone(),
                password_hash: hash_password(password)?,
            },
        );
        info!(email = %email, "Registered local account");
        Ok(id)
    }

    fn email_for_token(&self, access_token: &str) -> Result<String, AuthError> {
        self.jwt
            .verify_token(access_token)
            .claims
            .and_then(|claims| claims.email)
            .ok_or(AuthError::MissingSession)
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let id = {
            let account = self
                .accounts
                .get(email)
                .ok_or(AuthError::InvalidCredentials)?;
            if !verify_password(password, &account.password_hash)? {
                return Err(AuthError::InvalidCredentials);
            }
            account.id.clone()
        };

        let access_token = self
            .jwt
            .generate_token(TokenInput {
                user_id: id.clone(),
                email: Some(email.to_string()),
            })
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(AuthSession {
            access_token,
            refresh_token: None,
            token_type: "bearer".to_string(),
            expires_in: self.jwt.expiry_seconds(),
            user: AuthUser {
                id,
                email: Some(email.to_string()),
            },
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        // Unknown addresses succeed silently, like the hosted service
        if self.accounts.contains_key(email) {
            info!(email = %email, redirect_to = %redirect_to, "Password recovery link (dev mode, not sent)");
        }
        Ok(())
    }

    async fn update_password(&self, access_token: &str, password: &str) -> Result<(), AuthError> {
        let email = self.email_for_token(access_token)?;
        let password_hash = hash_password(password)?;
        let mut account = self
            .accounts
            .get_mut(&email)
            .ok_or(AuthError::MissingSession)?;
        account.password_hash = password_hash;
        Ok(())
    }
}
