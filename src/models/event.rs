//! Community events

use serde::{Deserialize, Serialize};

use super::timestamp::{blank_as_none, blank_as_null_patch};
use super::{
    double_option, normalize_optional, normalize_patch_field, require_text, Timestamp,
    ValidationError,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub location: Option<String>,
    pub url: Option<String>,
    pub is_recurring: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub start_date: Timestamp,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub end_date: Option<Timestamp>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
}

impl NewEvent {
    pub fn new(title: impl Into<String>, start_date: Timestamp) -> Self {
        Self {
            title: title.into(),
            start_date,
            description: None,
            end_date: None,
            location: None,
            url: None,
            is_recurring: false,
        }
    }

    pub fn normalized(self) -> Self {
        Self {
            description: normalize_optional(self.description),
            location: normalize_optional(self.location),
            url: normalize_optional(self.url),
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.title, "Title")?;
        check_date_order(Some(self.start_date), self.end_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "blank_as_null_patch")]
    pub end_date: Option<Option<Timestamp>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recurring: Option<bool>,
}

impl EventPatch {
    pub fn normalized(self) -> Self {
        Self {
            description: normalize_patch_field(self.description),
            location: normalize_patch_field(self.location),
            url: normalize_patch_field(self.url),
            ..self
        }
    }

    /// Date order is only checked when the patch carries both dates;
    /// the stored row is not consulted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            require_text(title, "Title")?;
        }
        check_date_order(self.start_date, self.end_date.flatten())
    }
}

fn check_date_order(
    start: Option<Timestamp>,
    end: Option<Timestamp>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(ValidationError::EndBeforeStart),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_before_start_rejected() {
        let start = Timestamp::now();
        let mut input = NewEvent::new("Food drive", start);
        input.end_date = Some(start.offset_seconds(-60));
        assert_eq!(input.validate(), Err(ValidationError::EndBeforeStart));

        input.end_date = Some(start);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_patch_checks_dates_only_when_both_present() {
        let start = Timestamp::now();
        let patch = EventPatch {
            end_date: Some(Some(start.offset_seconds(-60))),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());

        let patch = EventPatch {
            start_date: Some(start),
            end_date: Some(Some(start.offset_seconds(-60))),
            ..Default::default()
        };
        assert_eq!(patch.validate(), Err(ValidationError::EndBeforeStart));
    }

    #[test]
    fn test_empty_end_date_from_form() {
        let input: NewEvent = serde_json::from_str(
            r#"{"title":"Job fair","start_date":"2025-03-01T15:00:00.000Z","end_date":"","location":""}"#,
        )
        .unwrap();
        let input = input.normalized();
        assert_eq!(input.end_date, None);
        assert_eq!(input.location, None);
        assert!(!input.is_recurring);
    }
}
