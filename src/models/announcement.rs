//! Announcements
//!
//! An announcement is active while `date_expired` is unset or not yet past.

use serde::{Deserialize, Serialize};

use super::timestamp::{blank_as_none, blank_as_null_patch};
use super::{require_text, Timestamp, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub date_expired: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Announcement {
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.date_expired.map_or(true, |expires| expires >= now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub date_expired: Option<Timestamp>,
}

impl NewAnnouncement {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            date_expired: None,
        }
    }

    /// No optional text columns; blank `date_expired` is handled when the
    /// payload is deserialized
    pub fn normalized(self) -> Self {
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.title, "Title")?;
        require_text(&self.content, "Content")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnouncementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "blank_as_null_patch")]
    pub date_expired: Option<Option<Timestamp>>,
}

impl AnnouncementPatch {
    pub fn normalized(self) -> Self {
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            require_text(title, "Title")?;
        }
        if let Some(content) = &self.content {
            require_text(content, "Content")?;
        }
        Ok(())
    }
}
