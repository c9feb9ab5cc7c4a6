//! Service directory entries

use serde::{Deserialize, Serialize};

use super::{
    double_option, normalize_optional, normalize_patch_field, require_text, ResourceCategory,
    Timestamp, ValidationError,
};

/// A stored resource row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub category: ResourceCategory,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

fn default_active() -> bool {
    true
}

/// Insert payload. Omitted optional fields serialize as explicit nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewResource {
    pub name: String,
    pub category: ResourceCategory,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl NewResource {
    pub fn new(name: impl Into<String>, category: ResourceCategory) -> Self {
        Self {
            name: name.into(),
            category,
            description: None,
            website: None,
            phone: None,
            email: None,
            address: None,
            is_active: true,
        }
    }

    pub fn normalized(self) -> Self {
        Self {
            description: normalize_optional(self.description),
            website: normalize_optional(self.website),
            phone: normalize_optional(self.phone),
            email: normalize_optional(self.email),
            address: normalize_optional(self.address),
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "Name")
    }
}

/// Partial update. `None` leaves a column untouched; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ResourceCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub website: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ResourcePatch {
    pub fn normalized(self) -> Self {
        Self {
            description: normalize_patch_field(self.description),
            website: normalize_patch_field(self.website),
            phone: normalize_patch_field(self.phone),
            email: normalize_patch_field(self.email),
            address: normalize_patch_field(self.address),
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.name {
            Some(name) => require_text(name, "Name"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_resource_defaults_from_minimal_json() {
        let input: NewResource =
            serde_json::from_str(r#"{"name":"City Food Bank","category":"Food"}"#).unwrap();
        assert_eq!(input, NewResource::new("City Food Bank", ResourceCategory::Food));
        assert!(input.is_active);

        let value = serde_json::to_value(&input).unwrap();
        for field in ["description", "website", "phone", "email", "address"] {
            assert_eq!(value[field], serde_json::Value::Null, "{field} should be null");
        }
    }

    #[test]
    fn test_new_resource_normalizes_blank_fields() {
        let input = NewResource {
            phone: Some(String::new()),
            website: Some("https://foodbank.example".into()),
            ..NewResource::new("  City Food Bank ", ResourceCategory::Food)
        }
        .normalized();

        assert_eq!(input.name, "City Food Bank");
        assert_eq!(input.phone, None);
        assert_eq!(input.website.as_deref(), Some("https://foodbank.example"));
    }

    #[test]
    fn test_patch_distinguishes_absent_from_null() {
        let patch: ResourcePatch =
            serde_json::from_str(r#"{"phone":null,"is_active":false}"#).unwrap();
        assert_eq!(patch.phone, Some(None));
        assert_eq!(patch.email, None);
        assert_eq!(patch.is_active, Some(false));

        let value = serde_json::to_value(&patch).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert!(obj["phone"].is_null());
    }

    #[test]
    fn test_patch_blank_string_becomes_null() {
        let patch = ResourcePatch {
            phone: Some(Some(String::new())),
            ..Default::default()
        }
        .normalized();
        assert_eq!(patch.phone, Some(None));
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            NewResource::new("   ", ResourceCategory::Other).validate(),
            Err(ValidationError::Required("Name"))
        );
        let patch = ResourcePatch {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        assert!(ResourcePatch::default().validate().is_ok());
    }
}
