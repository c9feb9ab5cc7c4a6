//! Configuration
//!
//! CLI arguments and environment variable handling using clap. A `.env`
//! file is loaded first by `main`.

use clap::Parser;
use std::net::SocketAddr;

/// Base URL used when neither SITE_URL nor VERCEL_URL is set
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";

/// CommonGround content service
#[derive(Parser, Debug, Clone)]
#[command(name = "commonground")]
#[command(about = "Content service for the CommonGround community site")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Enable development mode (in-memory fallbacks, local auth provider)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "commonground")]
    pub mongodb_db: String,

    /// Service-role MongoDB URI for contact submissions (defaults to MONGODB_URI)
    #[arg(long, env = "MONGODB_SERVICE_URI")]
    pub mongodb_service_uri: Option<String>,

    /// Secret the auth service signs session tokens with (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// Session lifetime for tokens minted by the local dev provider
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "3600")]
    pub jwt_expiry_seconds: u64,

    /// Hosted auth API root (GoTrue-compatible), e.g. https://xyz.example.co/auth/v1
    #[arg(long, env = "AUTH_URL")]
    pub auth_url: Option<String>,

    /// Public API key sent to the hosted auth service
    #[arg(long, env = "AUTH_API_KEY")]
    pub auth_api_key: Option<String>,

    /// Read-only demo account email (unset disables demo mode)
    #[arg(long, env = "DEMO_ACCOUNT_EMAIL")]
    pub demo_account_email: Option<String>,

    /// Public site URL used in password recovery links
    #[arg(long, env = "SITE_URL")]
    pub site_url: Option<String>,

    /// Deployment host name, used for recovery links when SITE_URL is unset
    #[arg(long, env = "VERCEL_URL")]
    pub vercel_url: Option<String>,

    /// Dev mode account seeded into the local auth provider
    #[arg(long, env = "DEV_ADMIN_EMAIL", default_value = "admin@commonground.local")]
    pub dev_admin_email: String,

    /// Password for the seeded dev account
    #[arg(long, env = "DEV_ADMIN_PASSWORD", default_value = "commonground")]
    pub dev_admin_password: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Outbound request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "10000")]
    pub request_timeout_ms: u64,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Args {
    /// Base URL for recovery links: SITE_URL, then https://VERCEL_URL,
    /// then localhost
    pub fn site_url(&self) -> String {
        if let Some(url) = non_blank(&self.site_url) {
            return url.trim_end_matches('/').to_string();
        }
        if let Some(host) = non_blank(&self.vercel_url) {
            return format!("https://{}", host.trim_end_matches('/'));
        }
        DEFAULT_SITE_URL.to_string()
    }

    /// Demo account email, blank treated as unset
    pub fn demo_account_email(&self) -> Option<String> {
        non_blank(&self.demo_account_email).map(str::to_string)
    }

    pub fn service_mongodb_uri(&self) -> &str {
        non_blank(&self.mongodb_service_uri).unwrap_or(&self.mongodb_uri)
    }

    /// Whether the hosted auth service is configured
    pub fn hosted_auth(&self) -> Option<(&str, &str)> {
        Some((non_blank(&self.auth_url)?, non_blank(&self.auth_api_key)?))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode {
            if self.jwt_secret.is_none() {
                return Err("JWT_SECRET is required in production mode".to_string());
            }
            if self.hosted_auth().is_none() {
                return Err("AUTH_URL and AUTH_API_KEY are required in production mode".to_string());
            }
        }

        if self.auth_url.is_some() != self.auth_api_key.is_some() {
            return Err("AUTH_URL and AUTH_API_KEY must be set together".to_string());
        }

        Ok(())
    }
}
