//! Resource directory categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceCategory {
    Housing,
    Employment,
    Food,
    #[serde(rename = "Mental Health")]
    MentalHealth,
    Healthcare,
    Legal,
    Education,
    Transportation,
    Financial,
    Other,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 10] = [
        Self::Housing,
        Self::Employment,
        Self::Food,
        Self::MentalHealth,
        Self::Healthcare,
        Self::Legal,
        Self::Education,
        Self::Transportation,
        Self::Financial,
        Self::Other,
    ];

    /// Display and storage spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Housing => "Housing",
            Self::Employment => "Employment",
            Self::Food => "Food",
            Self::MentalHealth => "Mental Health",
            Self::Healthcare => "Healthcare",
            Self::Legal => "Legal",
            Self::Education => "Education",
            Self::Transportation => "Transportation",
            Self::Financial => "Financial",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown resource category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for ResourceCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
