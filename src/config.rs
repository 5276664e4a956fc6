//! Configuration options for the application core

use growth_space_ai::GeminiOptions;
use std::time::Duration;

/// Configuration options for [`crate::GrowthSpace`]
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// The request timeout applied to collaborator calls
    pub request_timeout: Option<Duration>,

    /// Generative model endpoint and model selection
    pub ai: GeminiOptions,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            ai: GeminiOptions::default(),
        }
    }
}

impl AppOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the generative model options
    pub fn with_ai_options(mut self, value: GeminiOptions) -> Self {
        self.ai = value;
        self
    }
}
