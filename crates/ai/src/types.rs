//! Wire types for the generative model API

use serde::{Deserialize, Serialize};

/// Response envelope returned by `generateContent`
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// A single model candidate
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

/// Candidate content: an ordered list of parts
#[derive(Debug, Clone, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single content part
#[derive(Debug, Clone, Deserialize)]
pub struct Part {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, or `None` when the model
    /// returned no usable content.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let content = candidate.content.as_ref()?;
        let joined: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if joined.trim().is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}

/// Structured motivation tip payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotivationPayload {
    pub quote: String,
    pub author: String,
    pub action_step: String,
}

/// Result of decomposing a free-text routine narrative
#[derive(Debug, Clone, Deserialize)]
pub struct RoutinePayload {
    #[serde(default)]
    pub habits: Vec<HabitSeed>,
    pub identity: String,
}

/// Partial habit fields as the model emits them. Everything is optional and
/// string-typed at this boundary; the application fills defaults and drops
/// values it cannot interpret.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HabitSeed {
    pub name: Option<String>,
    pub category: Option<String>,
    pub frequency: Option<String>,
    pub days_of_week: Option<Vec<i64>>,
    pub specific_dates: Option<Vec<String>>,
    pub is_one_time: Option<bool>,
    pub time: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// A suggestion card as the model emits it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPayload {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub action_label: String,
    #[serde(default)]
    pub suggested_action: Option<ActionPayload>,
}

/// The action attached to a suggestion card
#[derive(Debug, Clone, Deserialize)]
pub struct ActionPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: HabitSeed,
}
