//! Due-date computation and completion toggling
//!
//! Pure calendar logic over habit records: no I/O, no clock access. The
//! caller supplies the date in the viewer's local calendar.

use chrono::{Datelike, NaiveDate};

use super::{Habit, RecurrenceMode};

/// Day-of-week index of a date, 0 = Sunday through 6 = Saturday
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

impl Habit {
    /// Whether this habit is scheduled to be actionable on `date`.
    ///
    /// One-time habits are due exactly on their `specific_dates`; the
    /// start/end bounds do not apply to them. Recurring habits are due when
    /// the date's day-of-week is in `days_of_week` and the date falls inside
    /// the inclusive bounds.
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        match self.mode {
            RecurrenceMode::OneTime => self.specific_dates.contains(&date),
            RecurrenceMode::Recurring => {
                if !self.days_of_week.contains(&day_of_week(date)) {
                    return false;
                }
                if self.start_date.map_or(false, |start| date < start) {
                    return false;
                }
                if self.end_date.map_or(false, |end| date > end) {
                    return false;
                }
                true
            }
        }
    }

    /// Whether `date` is marked complete.
    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completed_dates.contains(&date)
    }

    /// Toggle completion of `date`, returning the adjusted habit.
    ///
    /// The streak is an incrementally maintained counter: plus one per
    /// toggle-on, minus one per toggle-off, floored at zero. It is never
    /// recomputed from the completion history, so toggling any past date
    /// moves it whether or not that date sits in a consecutive run.
    #[must_use]
    pub fn with_completion_toggled(&self, date: NaiveDate) -> Habit {
        let mut updated = self.clone();
        if updated.completed_dates.remove(&date) {
            updated.streak = updated.streak.saturating_sub(1);
        } else {
            updated.completed_dates.insert(date);
            updated.streak += 1;
        }
        updated
    }
}
