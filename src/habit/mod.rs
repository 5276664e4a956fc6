//! Habit records, drafts and the recurrence model

mod occurrence;
pub mod stats;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use crate::error::{Error, Result};

pub use occurrence::day_of_week;

/// The fixed category set habits and focus areas draw from
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Category {
    Health,
    #[default]
    Mindset,
    Productivity,
    Finance,
    Social,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Health,
        Category::Mindset,
        Category::Productivity,
        Category::Finance,
        Category::Social,
    ];

    /// Parse a category label, falling back to the creation default for
    /// anything unrecognized.
    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "Health" => Category::Health,
            "Mindset" => Category::Mindset,
            "Productivity" => Category::Productivity,
            "Finance" => Category::Finance,
            "Social" => Category::Social,
            _ => Category::default(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Health => "Health",
            Category::Mindset => "Mindset",
            Category::Productivity => "Productivity",
            Category::Finance => "Finance",
            Category::Social => "Social",
        };
        write!(f, "{label}")
    }
}

/// Legacy cadence label; carried on the wire, unused by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
}

impl Frequency {
    /// Parse a frequency label, falling back to daily
    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "weekly" => Frequency::Weekly,
            _ => Frequency::Daily,
        }
    }
}

/// How a habit recurs: on a weekly day set, or on explicit dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecurrenceMode {
    #[default]
    Recurring,
    OneTime,
}

/// A habit record.
///
/// Serialized in the persisted wire shape: camelCase keys, dates as
/// `YYYY-MM-DD` strings, the recurrence mode as the `isOneTime` flag.
/// Decoding is lenient about dates: unparseable occurrence dates are
/// dropped and unparseable bounds read as absent, so a damaged record
/// loads instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(rename = "isOneTime", default, with = "one_time_flag")]
    pub mode: RecurrenceMode,
    /// Weekly schedule, day indices 0-6 with Sunday as 0; empty means
    /// never due
    #[serde(default, deserialize_with = "lenient_day_set")]
    pub days_of_week: BTreeSet<u8>,
    /// Explicit due dates for one-time habits
    #[serde(
        default,
        skip_serializing_if = "BTreeSet::is_empty",
        deserialize_with = "lenient_date_set"
    )]
    pub specific_dates: BTreeSet<NaiveDate>,
    /// "HH:mm" display hint, not used in due-date computation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Inclusive lower bound; absent means unbounded
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_date"
    )]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound; absent means unbounded
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_date"
    )]
    pub end_date: Option<NaiveDate>,
    /// Net completion toggles, floored at zero; adjusted only by
    /// [`Habit::with_completion_toggled`]
    #[serde(default)]
    pub streak: u32,
    #[serde(default, deserialize_with = "lenient_date_set")]
    pub completed_dates: BTreeSet<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Build a new habit from a draft, applying the creation defaults.
    ///
    /// Refuses drafts whose name is missing, empty or whitespace-only.
    pub(crate) fn from_draft(draft: &HabitDraft) -> Result<Self> {
        let name = draft.name.as_deref().map(str::trim).unwrap_or("");
        if name.is_empty() {
            return Err(Error::validation("habit name must not be empty"));
        }

        let mode = draft.mode.unwrap_or_default();
        let days_of_week = match &draft.days_of_week {
            Some(days) if !days.is_empty() => sanitize_days(days),
            _ => match mode {
                RecurrenceMode::OneTime => BTreeSet::new(),
                RecurrenceMode::Recurring => (0..=6).collect(),
            },
        };

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: draft.category.unwrap_or_default(),
            frequency: draft.frequency.unwrap_or_default(),
            mode,
            days_of_week,
            specific_dates: draft.specific_dates.clone().unwrap_or_default(),
            time: Some(draft.time.clone().unwrap_or_else(|| "08:00".to_string())),
            description: draft.description.clone(),
            start_date: draft.start_date,
            end_date: draft.end_date,
            streak: 0,
            completed_dates: BTreeSet::new(),
            created_at: Utc::now(),
        })
    }

    /// Merge a draft over this habit.
    ///
    /// `id`, `streak`, `completed_dates` and `created_at` are preserved;
    /// only the toggle operation touches completion state.
    pub(crate) fn merged_with(&self, draft: &HabitDraft) -> Result<Self> {
        if let Some(name) = &draft.name {
            if name.trim().is_empty() {
                return Err(Error::validation("habit name must not be empty"));
            }
        }

        let mut updated = self.clone();
        if let Some(name) = &draft.name {
            updated.name = name.trim().to_string();
        }
        if let Some(category) = draft.category {
            updated.category = category;
        }
        if let Some(frequency) = draft.frequency {
            updated.frequency = frequency;
        }
        if let Some(mode) = draft.mode {
            updated.mode = mode;
        }
        if let Some(days) = &draft.days_of_week {
            updated.days_of_week = sanitize_days(days);
        }
        if let Some(dates) = &draft.specific_dates {
            updated.specific_dates = dates.clone();
        }
        if let Some(time) = &draft.time {
            updated.time = Some(time.clone());
        }
        if let Some(description) = &draft.description {
            updated.description = Some(description.clone());
        }
        if let Some(start) = draft.start_date {
            updated.start_date = Some(start);
        }
        if let Some(end) = draft.end_date {
            updated.end_date = Some(end);
        }
        Ok(updated)
    }
}

/// Partial habit fields for create and update operations.
///
/// Field defaults are filled explicitly at creation; see
/// [`Habit::from_draft`].
#[derive(Debug, Clone, Default)]
pub struct HabitDraft {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub frequency: Option<Frequency>,
    pub mode: Option<RecurrenceMode>,
    pub days_of_week: Option<BTreeSet<u8>>,
    pub specific_dates: Option<BTreeSet<NaiveDate>>,
    pub time: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl HabitDraft {
    /// Start a draft with just a name
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Set the category
    pub fn with_category(mut self, value: Category) -> Self {
        self.category = Some(value);
        self
    }

    /// Set the weekly day-of-week schedule
    pub fn with_days_of_week<I: IntoIterator<Item = u8>>(mut self, days: I) -> Self {
        self.days_of_week = Some(days.into_iter().collect());
        self
    }

    /// Mark the draft one-time, due on exactly the given dates
    pub fn one_time_on<I: IntoIterator<Item = NaiveDate>>(mut self, dates: I) -> Self {
        self.mode = Some(RecurrenceMode::OneTime);
        self.specific_dates = Some(dates.into_iter().collect());
        self
    }

    /// Set the time-of-day hint
    pub fn with_time(mut self, value: &str) -> Self {
        self.time = Some(value.to_string());
        self
    }

    /// Set the description
    pub fn with_description(mut self, value: &str) -> Self {
        self.description = Some(value.to_string());
        self
    }

    /// Set the inclusive start bound
    pub fn with_start_date(mut self, value: NaiveDate) -> Self {
        self.start_date = Some(value);
        self
    }

    /// Set the inclusive end bound
    pub fn with_end_date(mut self, value: NaiveDate) -> Self {
        self.end_date = Some(value);
        self
    }
}

fn sanitize_days(days: &BTreeSet<u8>) -> BTreeSet<u8> {
    days.iter().copied().filter(|day| *day <= 6).collect()
}

mod one_time_flag {
    use super::RecurrenceMode;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        mode: &RecurrenceMode,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_bool(matches!(mode, RecurrenceMode::OneTime))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<RecurrenceMode, D::Error> {
        let one_time = bool::deserialize(deserializer)?;
        Ok(if one_time {
            RecurrenceMode::OneTime
        } else {
            RecurrenceMode::Recurring
        })
    }
}

fn lenient_date_set<'de, D>(deserializer: D) -> std::result::Result<BTreeSet<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(raw.iter().filter_map(|value| value.parse().ok()).collect())
}

fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.parse().ok()))
}

fn lenient_day_set<'de, D>(deserializer: D) -> std::result::Result<BTreeSet<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<i64>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter(|day| (0..=6).contains(day))
        .map(|day| day as u8)
        .collect())
}
