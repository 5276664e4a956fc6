use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Notify;

use growth_space::error::{Error, Result};
use growth_space::prelude::*;

fn date(value: &str) -> NaiveDate {
    value.parse().unwrap()
}

fn create_card(id: &str, name: &str, due: NaiveDate) -> SuggestedCard {
    SuggestedCard {
        id: id.to_string(),
        title: format!("Schedule {name}"),
        description: "Detected in your log.".to_string(),
        kind: SuggestionKind::Schedule,
        action_label: "Add it".to_string(),
        suggested_action: Some(SuggestedAction::CreateHabit(
            HabitDraft::named(name)
                .with_category(Category::Health)
                .one_time_on([due]),
        )),
    }
}

fn actionless_card(id: &str) -> SuggestedCard {
    SuggestedCard {
        id: id.to_string(),
        title: "Note".to_string(),
        description: String::new(),
        kind: SuggestionKind::Optimization,
        action_label: "Noted".to_string(),
        suggested_action: None,
    }
}

#[derive(Default)]
struct StubAdvisor {
    cards: Vec<SuggestedCard>,
    routine: Vec<HabitDraft>,
    fail: bool,
    entered: Option<Arc<Notify>>,
    release: Option<Arc<Notify>>,
}

#[async_trait]
impl Advisor for StubAdvisor {
    async fn motivation(&self, _focus_area: &str) -> Result<MotivationTip> {
        Ok(MotivationTip::fallback())
    }

    async fn progress_insight(&self, _habits: &[Habit]) -> Result<String> {
        Ok("Steady.".to_string())
    }

    async fn decompose_routine(&self, _narrative: &str) -> Result<RoutineBreakdown> {
        if self.fail {
            return Err(Error::EmptyResponse);
        }
        Ok(RoutineBreakdown {
            habits: self.routine.clone(),
            identity_statement: "I am a person who shows up.".to_string(),
        })
    }

    async fn suggest_from_log(
        &self,
        _log_text: &str,
        _habits: &[Habit],
        _today: NaiveDate,
    ) -> Result<Vec<SuggestedCard>> {
        if let Some(entered) = &self.entered {
            entered.notify_one();
        }
        if let Some(release) = &self.release {
            release.notified().await;
        }
        if self.fail {
            return Err(Error::collaborator("model unreachable"));
        }
        Ok(self.cards.clone())
    }
}

#[tokio::test]
async fn accepting_cards_creates_habits_and_drains_the_batch() {
    let mut app = GrowthSpace::new();
    app.attach_advisor(Arc::new(StubAdvisor {
        cards: vec![
            create_card("s1", "Dentist visit", date("2026-02-05")),
            actionless_card("s2"),
        ],
        ..StubAdvisor::default()
    }));

    let mut batch = app.submit_log("dentist on Feb 5").await.unwrap();
    assert_eq!(batch.len(), 2);

    let habit = app.accept_card(&mut batch, "s1").unwrap();
    assert_eq!(habit.name, "Dentist visit");
    assert_eq!(habit.mode, RecurrenceMode::OneTime);
    assert!(habit.is_due_on(date("2026-02-05")));
    assert!(habit.days_of_week.is_empty());
    assert_eq!(app.store().habits().len(), 1);
    assert!(!batch.is_complete());

    // Accepting the last card completes the batch even without an action
    assert!(app.accept_card(&mut batch, "s2").is_none());
    assert!(batch.is_complete());
    assert_eq!(app.store().habits().len(), 1);
}

#[tokio::test]
async fn collaborator_failure_degrades_to_an_empty_batch() {
    let mut app = GrowthSpace::new();
    app.attach_advisor(Arc::new(StubAdvisor {
        fail: true,
        ..StubAdvisor::default()
    }));

    let batch = app.submit_log("ran 5k today").await.unwrap();
    assert!(batch.is_complete());
    assert_eq!(app.store().habits().len(), 0);
}

#[tokio::test]
async fn blank_input_is_suppressed() {
    let mut app = GrowthSpace::new();
    app.attach_advisor(Arc::new(StubAdvisor::default()));

    assert!(app.submit_log("   ").await.is_none());
}

#[tokio::test]
async fn a_second_submission_while_one_is_in_flight_is_suppressed() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let advisor = StubAdvisor {
        cards: vec![actionless_card("s1")],
        entered: Some(Arc::clone(&entered)),
        release: Some(Arc::clone(&release)),
        ..StubAdvisor::default()
    };
    let review = Arc::new(LogReview::new(Arc::new(advisor)));

    let first = {
        let review = Arc::clone(&review);
        tokio::spawn(async move { review.submit("long day", &[], date("2026-02-01")).await })
    };

    entered.notified().await;
    assert!(review.is_busy());
    let second = review.submit("long day again", &[], date("2026-02-01")).await;
    assert!(second.is_none());

    release.notify_one();
    let first = first.await.unwrap();
    assert_eq!(first.unwrap().len(), 1);

    // The flag clears once the request resolves
    release.notify_one();
    let third = review.submit("third time", &[], date("2026-02-01")).await;
    assert!(third.is_some());
}

#[tokio::test]
async fn importing_a_routine_creates_habits_and_adopts_the_identity() {
    let mut app = GrowthSpace::new();
    app.store_mut()
        .set_profile(UserProfile::new("Dana", "dana@example.com"));
    app.attach_advisor(Arc::new(StubAdvisor {
        routine: vec![
            HabitDraft::named("Morning run").with_days_of_week([1, 3, 5]),
            HabitDraft::default(), // unusable: no name
        ],
        ..StubAdvisor::default()
    }));

    let created = app.import_routine("I wake at 6 and run.").await.unwrap();
    assert_eq!(created, 1);

    let habit = &app.store().habits()[0];
    assert_eq!(habit.name, "Morning run");
    // Imported habits start today unless the advisor proposed a date
    assert!(habit.start_date.is_some());

    let profile = app.store().profile().unwrap();
    assert_eq!(profile.identity_statement, "I am a person who shows up.");
    assert_eq!(profile.narrative.as_deref(), Some("I wake at 6 and run."));
}

#[tokio::test]
async fn a_failed_decomposition_surfaces_to_the_caller() {
    let mut app = GrowthSpace::new();
    app.attach_advisor(Arc::new(StubAdvisor {
        fail: true,
        ..StubAdvisor::default()
    }));

    let result = app.import_routine("my routine").await;
    assert!(matches!(result, Err(Error::EmptyResponse)));
    assert_eq!(app.store().habits().len(), 0);
}

#[tokio::test]
async fn fallbacks_cover_a_missing_advisor() {
    let app = GrowthSpace::new();

    let tip = app.daily_inspiration().await;
    assert_eq!(tip, MotivationTip::fallback());

    let insight = app.progress_insight().await;
    assert!(!insight.is_empty());

    assert!(app.submit_log("did things").await.unwrap().is_complete());
}
