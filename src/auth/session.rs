//! Caller context
//!
//! Resolved once per request from the `Authorization` header and passed
//! explicitly into every action.

use super::{extract_token_from_header, Claims, JwtValidator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentUser {
    user: Option<SessionUser>,
    access_token: Option<String>,
}

impl CurrentUser {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            user: Some(SessionUser {
                id: id.into(),
                email,
            }),
            access_token: None,
        }
    }

    pub fn from_claims(claims: Claims, access_token: &str) -> Self {
        Self {
            user: Some(SessionUser {
                id: claims.sub,
                email: claims.email,
            }),
            access_token: Some(access_token.to_string()),
        }
    }

    /// Resolve from a raw `Authorization` header value. Missing or invalid
    /// tokens resolve to an anonymous caller.
    pub fn resolve(validator: &JwtValidator, auth_header: Option<&str>) -> Self {
        let Some(token) = extract_token_from_header(auth_header) else {
            return Self::anonymous();
        };
        match validator.verify_token(token).claims {
            Some(claims) => Self::from_claims(claims, token),
            None => Self::anonymous(),
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn email(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.email.as_deref())
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}
