//! Public contact form submissions

use serde::{Deserialize, Serialize};

use super::{normalize_optional, require_text, Timestamp, ValidationError};

/// A stored submission. Write-only from the public site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    pub message: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    pub message: String,
}

impl NewContactSubmission {
    pub fn normalized(self) -> Self {
        Self {
            phone: normalize_optional(self.phone),
            organization: normalize_optional(self.organization),
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "Name")?;
        require_text(&self.email, "Email")?;
        if !self.email.contains('@') {
            return Err(ValidationError::InvalidEmail);
        }
        require_text(&self.message, "Message")
    }
}
