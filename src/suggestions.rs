//! AI-suggested habit changes and the review workflow
//!
//! Suggestion cards are ephemeral: a batch is created per collaborator
//! call, resolved card by card, and discarded. Nothing here is persisted.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;

use growth_space_ai::{ActionPayload, CardPayload, HabitSeed};

use crate::advisor::Advisor;
use crate::habit::{Category, Frequency, Habit, HabitDraft, RecurrenceMode};

/// The flavor of a suggestion card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuggestionKind {
    #[default]
    Optimization,
    Schedule,
    Priority,
}

impl SuggestionKind {
    /// Parse a kind label, reading anything unknown as `Optimization`
    fn parse_or_default(value: &str) -> Self {
        match value {
            "schedule" => SuggestionKind::Schedule,
            "priority" => SuggestionKind::Priority,
            _ => SuggestionKind::Optimization,
        }
    }
}

/// The action a card proposes
#[derive(Debug, Clone)]
pub enum SuggestedAction {
    CreateHabit(HabitDraft),
    ModifyHabit(HabitDraft),
}

impl SuggestedAction {
    fn from_payload(payload: ActionPayload) -> Option<Self> {
        let draft = draft_from_seed(&payload.payload);
        match payload.kind.as_str() {
            "create_habit" => Some(SuggestedAction::CreateHabit(draft)),
            "modify_habit" => Some(SuggestedAction::ModifyHabit(draft)),
            _ => None,
        }
    }
}

/// An ephemeral AI-proposed habit change
#[derive(Debug, Clone)]
pub struct SuggestedCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: SuggestionKind,
    pub action_label: String,
    pub suggested_action: Option<SuggestedAction>,
}

impl SuggestedCard {
    pub(crate) fn from_payload(payload: CardPayload) -> Self {
        Self {
            id: payload.id,
            title: payload.title,
            description: payload.description,
            kind: SuggestionKind::parse_or_default(&payload.kind),
            action_label: payload.action_label,
            suggested_action: payload
                .suggested_action
                .and_then(SuggestedAction::from_payload),
        }
    }
}

/// Convert a model seed into a typed draft, filling nothing implicitly:
/// unknown categories read as the create default, out-of-range weekdays and
/// unparseable dates are dropped.
pub(crate) fn draft_from_seed(seed: &HabitSeed) -> HabitDraft {
    let days_of_week = seed.days_of_week.as_ref().map(|days| {
        days.iter()
            .copied()
            .filter(|day| (0..=6).contains(day))
            .map(|day| day as u8)
            .collect::<BTreeSet<u8>>()
    });
    let specific_dates = seed.specific_dates.as_ref().map(|dates| {
        dates
            .iter()
            .filter_map(|value| value.parse::<NaiveDate>().ok())
            .collect::<BTreeSet<NaiveDate>>()
    });

    HabitDraft {
        name: seed.name.clone(),
        category: seed.category.as_deref().map(Category::parse_or_default),
        frequency: seed.frequency.as_deref().map(Frequency::parse_or_default),
        mode: seed.is_one_time.map(|one_time| {
            if one_time {
                RecurrenceMode::OneTime
            } else {
                RecurrenceMode::Recurring
            }
        }),
        days_of_week,
        specific_dates,
        time: seed.time.clone(),
        description: seed.description.clone(),
        start_date: seed.start_date.as_deref().and_then(|value| value.parse().ok()),
        end_date: seed.end_date.as_deref().and_then(|value| value.parse().ok()),
    }
}

/// A transient batch of suggestion cards under review
#[derive(Debug, Clone, Default)]
pub struct SuggestionBatch {
    cards: Vec<SuggestedCard>,
}

impl SuggestionBatch {
    pub(crate) fn new(cards: Vec<SuggestedCard>) -> Self {
        Self { cards }
    }

    /// The pending cards
    pub fn cards(&self) -> &[SuggestedCard] {
        &self.cards
    }

    /// Number of pending cards
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether every card has been accepted or dismissed
    pub fn is_complete(&self) -> bool {
        self.cards.is_empty()
    }

    /// Accept a card: remove it from the batch and hand back the draft when
    /// its action creates a habit. Any other or absent action resolves the
    /// card with no further effect.
    pub fn accept(&mut self, card_id: &str) -> Option<HabitDraft> {
        let position = self.cards.iter().position(|card| card.id == card_id)?;
        let card = self.cards.remove(position);
        match card.suggested_action {
            Some(SuggestedAction::CreateHabit(draft)) => Some(draft),
            _ => None,
        }
    }

    /// Dismiss a card without side effects
    pub fn dismiss(&mut self, card_id: &str) {
        self.cards.retain(|card| card.id != card_id);
    }
}

/// The log-submission workflow: one request in flight at a time, failing
/// open to an empty batch when the collaborator misbehaves.
pub struct LogReview {
    advisor: Arc<dyn Advisor>,
    busy: AtomicBool,
}

impl LogReview {
    pub fn new(advisor: Arc<dyn Advisor>) -> Self {
        Self {
            advisor,
            busy: AtomicBool::new(false),
        }
    }

    /// Whether a submission is currently in flight
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Submit a free-text activity log.
    ///
    /// Returns `None` when the input is blank or a submission is already in
    /// flight; otherwise a batch, empty when the collaborator failed.
    pub async fn submit(
        &self,
        log_text: &str,
        habits: &[Habit],
        today: NaiveDate,
    ) -> Option<SuggestionBatch> {
        if log_text.trim().is_empty() {
            return None;
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }

        let cards = match self.advisor.suggest_from_log(log_text, habits, today).await {
            Ok(cards) => cards,
            Err(err) => {
                log::warn!("suggestions unavailable, continuing without: {err}");
                Vec::new()
            }
        };
        self.busy.store(false, Ordering::SeqCst);
        Some(SuggestionBatch::new(cards))
    }
}
