//! The generative-AI collaborator seam
//!
//! [`Advisor`] is the contract the app programs against; the bundled
//! implementation adapts [`GeminiClient`]. Every call is fallible and
//! latent, so the fail-open helpers here resolve to fallback literals
//! instead of surfacing errors. The one exception is routine
//! decomposition, whose failures the caller handles.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use growth_space_ai::GeminiClient;

use crate::error::Result;
use crate::habit::{Habit, HabitDraft};
use crate::suggestions::{draft_from_seed, SuggestedCard};

/// A motivational tip with a concrete next step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotivationTip {
    pub quote: String,
    pub author: String,
    pub action_step: String,
}

impl MotivationTip {
    /// The tip used whenever the collaborator cannot provide one
    pub fn fallback() -> Self {
        Self {
            quote: "Success is the product of daily habits.".to_string(),
            author: "James Clear".to_string(),
            action_step: "Start with a habit that takes less than two minutes.".to_string(),
        }
    }
}

/// Insight used whenever progress analysis is unavailable
pub const FALLBACK_INSIGHT: &str =
    "Your consistency is the foundation of your success. Keep showing up!";

/// A routine narrative decomposed into habit drafts plus an identity
/// statement
#[derive(Debug, Clone)]
pub struct RoutineBreakdown {
    pub habits: Vec<HabitDraft>,
    pub identity_statement: String,
}

/// The generative collaborator contract
#[async_trait]
pub trait Advisor: Send + Sync {
    /// A motivational tip for the given focus area
    async fn motivation(&self, focus_area: &str) -> Result<MotivationTip>;

    /// A one-sentence insight over the current habit data
    async fn progress_insight(&self, habits: &[Habit]) -> Result<String>;

    /// Decompose a free-text routine narrative.
    ///
    /// Fails with [`crate::error::Error::EmptyResponse`] when the
    /// collaborator returns no content.
    async fn decompose_routine(&self, narrative: &str) -> Result<RoutineBreakdown>;

    /// Suggestion cards derived from a free-text activity log.
    ///
    /// `today` anchors relative date phrases; unparseable payloads yield an
    /// empty list rather than an error.
    async fn suggest_from_log(
        &self,
        log_text: &str,
        habits: &[Habit],
        today: NaiveDate,
    ) -> Result<Vec<SuggestedCard>>;
}

#[async_trait]
impl Advisor for GeminiClient {
    async fn motivation(&self, focus_area: &str) -> Result<MotivationTip> {
        let payload = self.daily_inspiration(focus_area).await?;
        Ok(MotivationTip {
            quote: payload.quote,
            author: payload.author,
            action_step: payload.action_step,
        })
    }

    async fn progress_insight(&self, habits: &[Habit]) -> Result<String> {
        Ok(self.analyze_progress(&habits).await?)
    }

    async fn decompose_routine(&self, narrative: &str) -> Result<RoutineBreakdown> {
        let payload = self.parse_routine(narrative).await?;
        Ok(RoutineBreakdown {
            habits: payload.habits.iter().map(draft_from_seed).collect(),
            identity_statement: payload.identity,
        })
    }

    async fn suggest_from_log(
        &self,
        log_text: &str,
        habits: &[Habit],
        today: NaiveDate,
    ) -> Result<Vec<SuggestedCard>> {
        let payloads = self
            .generate_suggested_cards(log_text, &habits, today)
            .await?;
        Ok(payloads.into_iter().map(SuggestedCard::from_payload).collect())
    }
}

/// Fail-open motivation: the collaborator's tip, or the stock fallback
pub async fn motivation_or_fallback(advisor: &dyn Advisor, focus_area: &str) -> MotivationTip {
    match advisor.motivation(focus_area).await {
        Ok(tip) => tip,
        Err(err) => {
            log::warn!("motivation unavailable, using fallback: {err}");
            MotivationTip::fallback()
        }
    }
}

/// Fail-open progress insight: the collaborator's line, or the stock one
pub async fn insight_or_fallback(advisor: &dyn Advisor, habits: &[Habit]) -> String {
    match advisor.progress_insight(habits).await {
        Ok(insight) => insight,
        Err(err) => {
            log::warn!("progress insight unavailable, using fallback: {err}");
            FALLBACK_INSIGHT.to_string()
        }
    }
}
