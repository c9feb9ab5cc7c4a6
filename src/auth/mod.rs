//! Authentication and demo-mode gating
//!
//! Provides:
//! - JWT validation for session tokens issued by the hosted auth service
//! - Caller context ([`CurrentUser`]) resolved per request
//! - Demo-mode resolution ([`DemoGate`])
//! - The [`AuthProvider`] seam with a hosted (GoTrue-compatible) client and
//!   a local provider for dev mode
//! - Password hashing with Argon2 for the local provider

pub mod demo;
pub mod gotrue;
pub mod jwt;
pub mod local;
pub mod password;
pub mod provider;
pub mod session;

pub use demo::{DemoGate, DEMO_READ_ONLY_MESSAGE};
pub use gotrue::GoTrueProvider;
pub use jwt::{extract_token_from_header, Claims, JwtValidator, TokenInput, TokenValidationResult};
pub use local::LocalAuthProvider;
pub use password::{hash_password, verify_password};
pub use provider::{AuthError, AuthProvider, AuthSession, AuthUser};
pub use session::{CurrentUser, SessionUser};
