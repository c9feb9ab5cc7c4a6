//! Action layer
//!
//! The only entry point for mutations. Every content action runs the same
//! sequence: demo gate, payload normalization and validation, one store call,
//! outcome normalization, then invalidation of dependent views on success.
//! Nothing here returns an `Err`: callers branch on [`ActionResult`].

pub mod auth;
pub mod content;

pub use auth::{AuthActions, PASSWORD_MIN_LENGTH};
pub use content::ContentActions;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Tagged outcome of an action.
///
/// Serializes as `{"success":true}` or `{"error":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Success,
    Failure { message: String },
}

impl ActionResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure { message } => Some(message),
        }
    }
}

impl Serialize for ActionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Success => map.serialize_entry("success", &true)?,
            Self::Failure { message } => map.serialize_entry("error", message)?,
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        assert_eq!(
            serde_json::to_string(&ActionResult::Success).unwrap(),
            r#"{"success":true}"#
        );
        assert_eq!(
            serde_json::to_string(&ActionResult::failure("nope")).unwrap(),
            r#"{"error":"nope"}"#
        );
    }
}
