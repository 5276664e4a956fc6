//! The user profile record

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::habit::Category;

/// Profile created at onboarding and mutated in place afterwards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub email: String,

    /// Unused by the core logic; carried for the wire shape
    #[serde(default)]
    pub is_premium: bool,

    /// Free text, user-written or adopted from routine decomposition
    #[serde(default)]
    pub identity_statement: String,

    /// Focus areas drawn from the category enumeration
    #[serde(default)]
    pub focus_areas: BTreeSet<Category>,

    /// Free-text routine narrative feeding decomposition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

impl UserProfile {
    /// Create a profile with empty optional fields
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            is_premium: false,
            identity_statement: String::new(),
            focus_areas: BTreeSet::new(),
            narrative: None,
        }
    }

    /// The focus area used for motivation requests
    pub fn primary_focus(&self) -> Category {
        self.focus_areas.iter().next().copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_focus_defaults_when_unset() {
        let profile = UserProfile::new("Dana", "dana@example.com");
        assert_eq!(profile.primary_focus(), Category::Mindset);
    }

    #[test]
    fn wire_shape_uses_camel_case() {
        let mut profile = UserProfile::new("Dana", "dana@example.com");
        profile.focus_areas.insert(Category::Health);
        profile.identity_statement = "I am a person who shows up.".to_string();

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["identityStatement"], "I am a person who shows up.");
        assert_eq!(value["focusAreas"][0], "Health");
        assert_eq!(value["isPremium"], false);
        assert!(value.get("narrative").is_none());
    }
}
