//! Completion trend aggregation

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::Habit;

/// One day in the weekly completion trend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// Short weekday label ("Mon", "Tue", ...)
    pub label: String,
    /// Habits with this date in their completion set
    pub completed: usize,
}

/// Completion counts for the 7 calendar days ending at `reference_date`
/// inclusive, oldest first.
///
/// A habit counts for a day whenever that day is in its `completed_dates`,
/// whether or not the habit was due then; out-of-schedule completions are
/// part of the trend.
pub fn weekly_completion_trend(habits: &[Habit], reference_date: NaiveDate) -> Vec<TrendPoint> {
    (0..7)
        .rev()
        .map(|offset| {
            let date = reference_date - Duration::days(offset);
            let completed = habits
                .iter()
                .filter(|habit| habit.completed_dates.contains(&date))
                .count();
            TrendPoint {
                date,
                label: date.format("%a").to_string(),
                completed,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::HabitDraft;
    use super::*;
    use crate::habit::Habit;

    fn date(value: &str) -> NaiveDate {
        value.parse().unwrap()
    }

    fn habit_completed_on(dates: &[&str]) -> Habit {
        let mut habit = Habit::from_draft(&HabitDraft::named("Run")).unwrap();
        for value in dates {
            habit = habit.with_completion_toggled(date(value));
        }
        habit
    }

    #[test]
    fn trend_spans_exactly_seven_chronological_days() {
        let trend = weekly_completion_trend(&[], date("2026-01-10"));

        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].date, date("2026-01-04"));
        assert_eq!(trend[6].date, date("2026-01-10"));
        for window in trend.windows(2) {
            assert!(window[0].date < window[1].date);
        }
    }

    #[test]
    fn counts_membership_regardless_of_schedule() {
        // Sunday-only habit completed on a Tuesday still counts that Tuesday
        let mut habit = habit_completed_on(&["2026-01-06"]);
        habit.days_of_week = [0].into_iter().collect();

        let trend = weekly_completion_trend(&[habit], date("2026-01-10"));
        let tuesday = trend.iter().find(|p| p.date == date("2026-01-06")).unwrap();
        assert_eq!(tuesday.label, "Tue");
        assert_eq!(tuesday.completed, 1);
    }

    #[test]
    fn counts_are_bounded_by_habit_count() {
        let habits = vec![
            habit_completed_on(&["2026-01-08", "2026-01-09"]),
            habit_completed_on(&["2026-01-09"]),
        ];

        let trend = weekly_completion_trend(&habits, date("2026-01-10"));
        for point in &trend {
            assert!(point.completed <= habits.len());
        }
        let ninth = trend.iter().find(|p| p.date == date("2026-01-09")).unwrap();
        assert_eq!(ninth.completed, 2);
    }

    #[test]
    fn days_outside_the_window_are_ignored() {
        let habit = habit_completed_on(&["2026-01-01", "2026-01-10"]);
        let trend = weekly_completion_trend(&[habit], date("2026-01-10"));

        let total: usize = trend.iter().map(|p| p.completed).sum();
        assert_eq!(total, 1);
    }
}
