//! Growth Space Habit Tracking Core
//!
//! A client-side habit tracker: users define recurring or one-time habits,
//! mark them complete per day, follow streaks and a weekly completion
//! trend, and review AI-generated suggestions derived from free-text
//! journal input.
//!
//! The crate is organized around two local modules and two external
//! collaborators:
//!
//! - **Habit model + occurrence engine** (`habit`): pure calendar logic
//!   deciding when a habit is due and how completion toggles move the
//!   streak counter.
//! - **Habit store** (`store`): the canonical collection behind a single
//!   mutation interface, persisted fire-and-forget to a local JSON
//!   document or a hosted table sync.
//! - **AI collaborator** (`advisor` + the `growth-space-ai` crate): a
//!   fallible, latent source of motivation, insights and suggestion cards;
//!   every call site owns a fallback.
//! - **Sync collaborator** (the `growth-space-sync` crate): auth session
//!   plus per-user record upserts, last write wins.

pub mod advisor;
pub mod config;
pub mod error;
pub mod habit;
pub mod profile;
pub mod store;
pub mod suggestions;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use reqwest::Client;

use crate::advisor::{insight_or_fallback, motivation_or_fallback, Advisor, MotivationTip};
use crate::config::AppOptions;
use crate::error::{Error, Result};
use crate::habit::stats::{weekly_completion_trend, TrendPoint};
use crate::habit::Habit;
use crate::store::local::LocalStore;
use crate::store::{HabitStore, PersistenceBackend};
use crate::suggestions::{LogReview, SuggestionBatch};

pub use growth_space_ai::{GeminiClient, GeminiOptions};
pub use growth_space_sync::SyncClient;

/// The main entry point for the habit tracking core
pub struct GrowthSpace {
    options: AppOptions,
    http_client: Client,
    store: HabitStore,
    advisor: Option<Arc<dyn Advisor>>,
    review: Option<LogReview>,
}

impl Default for GrowthSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl GrowthSpace {
    /// An in-memory core with no durability and no advisor
    pub fn new() -> Self {
        Self::with_options(AppOptions::default())
    }

    /// An in-memory core with custom options
    pub fn with_options(options: AppOptions) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().unwrap_or_else(|_| Client::new());

        Self {
            options,
            http_client,
            store: HabitStore::new(),
            advisor: None,
            review: None,
        }
    }

    /// Open against the local JSON document at `path`
    pub async fn open_local(path: impl Into<PathBuf>, options: AppOptions) -> Self {
        let backend: Arc<dyn PersistenceBackend> = Arc::new(LocalStore::new(path));
        Self::open_with_backend(backend, options).await
    }

    /// Open against a custom persistence backend
    pub async fn open_with_backend(
        backend: Arc<dyn PersistenceBackend>,
        options: AppOptions,
    ) -> Self {
        let mut app = Self::with_options(options);
        app.store = HabitStore::open(backend).await;
        app
    }

    /// Attach the bundled generative advisor, sharing this app's HTTP
    /// client and model options
    pub fn connect_advisor(&mut self, api_key: &str) {
        let client =
            GeminiClient::with_http_client(api_key, self.http_client.clone(), self.options.ai.clone());
        self.attach_advisor(Arc::new(client));
    }

    /// Attach any advisor implementation
    pub fn attach_advisor(&mut self, advisor: Arc<dyn Advisor>) {
        self.review = Some(LogReview::new(Arc::clone(&advisor)));
        self.advisor = Some(advisor);
    }

    /// Build a sync client sharing this app's HTTP client
    pub fn sync_client(&self, base_url: &str, api_key: &str) -> SyncClient {
        SyncClient::with_http_client(base_url, api_key, self.http_client.clone())
    }

    /// The habit store
    pub fn store(&self) -> &HabitStore {
        &self.store
    }

    /// The habit store, mutably
    pub fn store_mut(&mut self) -> &mut HabitStore {
        &mut self.store
    }

    /// The configured options
    pub fn options(&self) -> &AppOptions {
        &self.options
    }

    /// Today's motivational tip for the profile's primary focus area.
    ///
    /// Never fails: without an advisor, or when the advisor errors, the
    /// stock tip is returned.
    pub async fn daily_inspiration(&self) -> MotivationTip {
        let focus = self
            .store
            .profile()
            .map(|profile| profile.primary_focus())
            .unwrap_or_default();
        match &self.advisor {
            Some(advisor) => motivation_or_fallback(advisor.as_ref(), &focus.to_string()).await,
            None => MotivationTip::fallback(),
        }
    }

    /// A one-sentence insight over current habit data.
    ///
    /// Never fails; degrades to the stock line.
    pub async fn progress_insight(&self) -> String {
        match &self.advisor {
            Some(advisor) => insight_or_fallback(advisor.as_ref(), self.store.habits()).await,
            None => advisor::FALLBACK_INSIGHT.to_string(),
        }
    }

    /// Decompose a routine narrative into habits and adopt its identity
    /// statement (the onboarding flow). Returns the number of habits
    /// created.
    ///
    /// Collaborator failures surface here, including empty responses; the
    /// caller decides how to retry.
    pub async fn import_routine(&mut self, narrative: &str) -> Result<usize> {
        let advisor = Arc::clone(
            self.advisor
                .as_ref()
                .ok_or_else(|| Error::collaborator("no advisor attached"))?,
        );
        let breakdown = advisor.decompose_routine(narrative).await?;

        let today = Local::now().date_naive();
        let mut created = 0;
        for mut draft in breakdown.habits {
            if draft.start_date.is_none() {
                draft.start_date = Some(today);
            }
            match self.store.create(&draft) {
                Ok(_) => created += 1,
                Err(err) => log::warn!("skipping unusable suggested habit: {err}"),
            }
        }

        if let Some(profile) = self.store.profile().cloned() {
            let mut profile = profile;
            profile.identity_statement = breakdown.identity_statement;
            profile.narrative = Some(narrative.to_string());
            self.store.set_profile(profile);
        }
        Ok(created)
    }

    /// Submit a free-text activity log for suggestions.
    ///
    /// Returns `None` when the input is blank or a submission is already in
    /// flight. Collaborator failures yield an empty batch; without an
    /// advisor the batch is empty too.
    pub async fn submit_log(&self, log_text: &str) -> Option<SuggestionBatch> {
        let today = Local::now().date_naive();
        match &self.review {
            Some(review) => review.submit(log_text, self.store.habits(), today).await,
            None => {
                if log_text.trim().is_empty() {
                    None
                } else {
                    Some(SuggestionBatch::default())
                }
            }
        }
    }

    /// Accept a card from a batch, creating the suggested habit.
    ///
    /// Cards whose action does not create a habit, and drafts the store
    /// refuses, resolve to `None`; the card is removed either way.
    pub fn accept_card(&mut self, batch: &mut SuggestionBatch, card_id: &str) -> Option<Habit> {
        let draft = batch.accept(card_id)?;
        match self.store.create(&draft) {
            Ok(habit) => Some(habit),
            Err(err) => {
                log::warn!("suggested habit rejected: {err}");
                None
            }
        }
    }

    /// The completion trend for the 7 days ending at `reference_date`
    pub fn weekly_trend(&self, reference_date: NaiveDate) -> Vec<TrendPoint> {
        weekly_completion_trend(self.store.habits(), reference_date)
    }

    /// Write the current state through synchronously
    pub async fn flush(&self) -> Result<()> {
        self.store.flush().await
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::advisor::{Advisor, MotivationTip, RoutineBreakdown};
    pub use crate::config::AppOptions;
    pub use crate::error::Error;
    pub use crate::habit::stats::TrendPoint;
    pub use crate::habit::{Category, Frequency, Habit, HabitDraft, RecurrenceMode};
    pub use crate::profile::UserProfile;
    pub use crate::store::local::LocalStore;
    pub use crate::store::remote::RemoteStore;
    pub use crate::store::{HabitStore, PersistenceBackend, StoredState};
    pub use crate::suggestions::{
        LogReview, SuggestedAction, SuggestedCard, SuggestionBatch, SuggestionKind,
    };
    pub use crate::GrowthSpace;
}
