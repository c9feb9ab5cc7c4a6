//! Content models
//!
//! Each entity has three shapes:
//! - the stored row (`Resource`, `Announcement`, `Event`) with store-assigned
//!   `id`, `created_at` and `updated_at`
//! - the insert payload (`NewResource`, ...) carrying caller-supplied fields
//! - the partial patch (`ResourcePatch`, ...) where an absent field is left
//!   untouched
//!
//! Optional text fields are stored as null when absent, never as `""`.
//! Every payload goes through `normalized()` before it reaches the store.

pub mod announcement;
pub mod category;
pub mod contact;
pub mod event;
pub mod resource;
pub mod timestamp;

pub use announcement::{Announcement, AnnouncementPatch, NewAnnouncement};
pub use category::{ResourceCategory, UnknownCategory};
pub use contact::{ContactSubmission, NewContactSubmission};
pub use event::{Event, EventPatch, NewEvent};
pub use resource::{NewResource, Resource, ResourcePatch};
pub use timestamp::Timestamp;

use serde::{Deserialize, Deserializer};
use std::fmt;

use crate::db::Table;

/// The three dashboard-managed content types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Resources,
    Announcements,
    Events,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [Self::Resources, Self::Announcements, Self::Events];

    /// Singular name used in messages ("resource", "announcement", "event")
    pub fn entity_name(&self) -> &'static str {
        match self {
            Self::Resources => "resource",
            Self::Announcements => "announcement",
            Self::Events => "event",
        }
    }

    /// Plural path segment ("resources", ...)
    pub fn segment(&self) -> &'static str {
        match self {
            Self::Resources => "resources",
            Self::Announcements => "announcements",
            Self::Events => "events",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.segment() == segment)
    }

    pub fn table(&self) -> Table {
        match self {
            Self::Resources => Table::Resources,
            Self::Announcements => Table::Announcements,
            Self::Events => Table::Events,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Payload validation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("End date must be on or after the start date")]
    EndBeforeStart,

    #[error("Invalid email address")]
    InvalidEmail,
}

/// Collapse a blank optional string to `None`.
///
/// Form inputs submit `""` for untouched optional fields; the store must see
/// null instead. Whitespace-only input counts as blank. Any other value is
/// kept exactly as submitted.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Patch flavor of [`normalize_optional`]: `Some("")` becomes `Some(None)`
/// (clear the column), `None` stays `None` (leave untouched).
pub fn normalize_patch_field(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(normalize_optional)
}

pub(crate) fn require_text(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

/// Distinguish an absent patch field from an explicit null.
///
/// Used with `#[serde(default)]`: absent -> `None`, `null` -> `Some(None)`.
pub(crate) fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
