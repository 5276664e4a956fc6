//! Generative AI collaborator client for Growth Space
//!
//! This crate wraps the generative-language `generateContent` REST API
//! behind the four operations the application uses: a daily motivation tip,
//! a one-sentence progress insight, routine-narrative decomposition, and
//! log-driven suggestion cards.

mod types;

use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use url::Url;

pub use types::*;

/// Error type for model API calls
#[derive(Debug, Error)]
pub enum AiError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {message} (Status: {status})")]
    Api {
        message: String,
        status: reqwest::StatusCode,
    },

    #[error("Empty response from model")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, AiError>;

/// Client options: endpoint and model selection
#[derive(Debug, Clone)]
pub struct GeminiOptions {
    /// Base URL of the generative-language API
    pub base_url: String,

    /// Model used for motivation, insight and suggestion calls
    pub flash_model: String,

    /// Model used for routine decomposition
    pub pro_model: String,
}

impl Default for GeminiOptions {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            flash_model: "gemini-3-flash-preview".to_string(),
            pro_model: "gemini-3-pro-preview".to_string(),
        }
    }
}

impl GeminiOptions {
    /// Set the API base URL
    pub fn with_base_url(mut self, value: &str) -> Self {
        self.base_url = value.to_string();
        self
    }

    /// Set the model used for lightweight calls
    pub fn with_flash_model(mut self, value: &str) -> Self {
        self.flash_model = value.to_string();
        self
    }

    /// Set the model used for routine decomposition
    pub fn with_pro_model(mut self, value: &str) -> Self {
        self.pro_model = value.to_string();
        self
    }
}

/// Generative model client
pub struct GeminiClient {
    api_key: String,
    http_client: Client,
    options: GeminiOptions,
}

impl GeminiClient {
    /// Create a new client with default options
    pub fn new(api_key: &str) -> Self {
        Self::with_options(api_key, GeminiOptions::default())
    }

    /// Create a new client with custom options
    pub fn with_options(api_key: &str, options: GeminiOptions) -> Self {
        Self::with_http_client(api_key, Client::new(), options)
    }

    /// Create a new client reusing an existing HTTP client
    pub fn with_http_client(api_key: &str, http_client: Client, options: GeminiOptions) -> Self {
        Self {
            api_key: api_key.to_string(),
            http_client,
            options,
        }
    }

    /// Issue a `generateContent` call and return the candidate text.
    ///
    /// Returns [`AiError::EmptyResponse`] when the model produced no usable
    /// content, so structured callers never parse a blank string.
    async fn generate(&self, model: &str, prompt: String, json_mode: bool) -> Result<String> {
        let mut url = Url::parse(&self.options.base_url)?;
        url.path_segments_mut()
            .map_err(|_| AiError::Url(url::ParseError::EmptyHost))?
            .push("v1beta")
            .push("models")
            .push(&format!("{}:generateContent", model));
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let mut body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        if json_mode {
            body["generationConfig"] = json!({ "responseMimeType": "application/json" });
        }

        let response = self.http_client.post(url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Api { message, status });
        }

        let payload = response.json::<GenerateContentResponse>().await?;
        payload.text().ok_or(AiError::EmptyResponse)
    }

    /// Fetch a daily motivation tip for the given focus area.
    pub async fn daily_inspiration(&self, focus_area: &str) -> Result<MotivationPayload> {
        let prompt = format!(
            "Give me a daily motivational quote and a small actionable \"atomic habit\" step \
             based on James Clear's principles for someone focusing on {focus_area}. \
             Return it as a JSON object with keys \"quote\", \"author\" and \"actionStep\", in English."
        );
        let text = self.generate(&self.options.flash_model, prompt, true).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Ask the model for a one-sentence insight over current habit data.
    pub async fn analyze_progress<S: Serialize>(&self, habits: &S) -> Result<String> {
        let context = serde_json::to_string(habits)?;
        let prompt = format!(
            "Review my current habits and completion data: {context}. \
             Provide a brief, motivating one-sentence insight about my progress or a \
             constructive tip for consistency based on \"Atomic Habits\" principles. \
             MUST BE IN ENGLISH."
        );
        self.generate(&self.options.flash_model, prompt, false)
            .await
    }

    /// Decompose a free-text routine narrative into habit seeds plus an
    /// identity statement.
    pub async fn parse_routine(&self, narrative: &str) -> Result<RoutinePayload> {
        let prompt = format!(
            "Analyze this routine narrative: \"{narrative}\". \
             1. Extract a list of atomic habits. For each, identify: name, category \
             (Health, Mindset, Productivity, Finance, Social), time (HH:mm if mentioned), \
             description, and daysOfWeek (array 0-6, 0 = Sunday). \
             2. Create a one-sentence \"Identity Statement\" (e.g. \"I am a person who...\") \
             based on these actions. \
             Return as a JSON object with keys \"habits\" and \"identity\", in English."
        );
        let text = self.generate(&self.options.pro_model, prompt, true).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Turn a free-text activity log into suggestion cards.
    ///
    /// `today` anchors relative date phrases ("tomorrow", "next Friday") to
    /// absolute calendar dates. A payload that fails to parse yields an empty
    /// list rather than an error; this boundary never raises on bad content.
    pub async fn generate_suggested_cards<S: Serialize>(
        &self,
        log_text: &str,
        habits: &S,
        today: NaiveDate,
    ) -> Result<Vec<CardPayload>> {
        let context = serde_json::to_string(habits)?;
        let today_str = today.format("%Y-%m-%d");
        let year = today.year();
        let prompt = format!(
            "User Input: \"{log_text}\". Current Date Context: Today is {today_str}. \
             Current habits: {context}. \
             Task: Suggest specific \"Atomic Habit\" optimizations or NEW scheduled \
             events/habits. Return results in English.\n\
             CRITICAL SCHEDULING RULES:\n\
             - If the user mentions a specific date like \"Feb 5\", \"tomorrow\", or \
             \"next Friday\", calculate that date precisely for the year {year}.\n\
             - For specific events (meetings, visits, appointments): ALWAYS set \
             'isOneTime': true, ALWAYS set 'specificDates': [\"YYYY-MM-DD\"] with the \
             calculated date, ALWAYS set 'daysOfWeek': [] (empty array), and set the \
             suggestedAction 'type' to 'create_habit'.\n\
             - For recurring habits: set 'isOneTime': false and 'daysOfWeek': [0-6] \
             based on the pattern.\n\
             Return as a JSON array of cards with keys id, title, description, type, \
             actionLabel and suggestedAction. The suggestedAction.type MUST be 'create_habit'."
        );
        let text = self.generate(&self.options.flash_model, prompt, true).await?;
        match serde_json::from_str::<Vec<CardPayload>>(&text) {
            Ok(cards) => Ok(cards),
            Err(err) => {
                log::warn!("discarding unparseable suggestion payload: {err}");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_concatenates_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [
                { "text": "Hello " },
                { "text": "world" }
            ]}}]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("Hello world"));
    }

    #[test]
    fn blank_response_text_is_none() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "   " }] } }]
        }))
        .unwrap();
        assert!(response.text().is_none());

        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.text().is_none());
    }
}
