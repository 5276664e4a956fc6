//! The canonical habit collection and its durability seam

pub mod local;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::habit::{Habit, HabitDraft};
use crate::profile::UserProfile;

/// State snapshot a backend yields at startup
#[derive(Debug, Clone, Default)]
pub struct StoredState {
    pub profile: Option<UserProfile>,
    pub habits: Vec<Habit>,
}

/// Durable storage for habits and the user profile
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Read the persisted state; called once at startup
    async fn load(&self) -> Result<StoredState>;

    /// Overwrite the persisted habit collection
    async fn save_habits(&self, habits: &[Habit]) -> Result<()>;

    /// Overwrite the persisted profile
    async fn save_profile(&self, profile: &UserProfile) -> Result<()>;
}

/// Owns the canonical habit list and profile.
///
/// Every mutation replaces the collection wholesale and then fires a
/// durability write without waiting for it: a failed write degrades to
/// "change visible in this session only", never to an error on the
/// mutation itself. Use [`HabitStore::flush`] to write through
/// synchronously (e.g. at shutdown).
pub struct HabitStore {
    habits: Vec<Habit>,
    profile: Option<UserProfile>,
    backend: Option<Arc<dyn PersistenceBackend>>,
    // Fair FIFO gate: each queued write gets an unbroken read-modify-write
    // of the backend.
    write_gate: Arc<tokio::sync::Mutex<()>>,
    // Writes still in flight; flush joins these before writing through.
    pending_writes: std::sync::Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

impl Default for HabitStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitStore {
    /// An in-memory store with no durability
    pub fn new() -> Self {
        Self {
            habits: Vec::new(),
            profile: None,
            backend: None,
            write_gate: Arc::new(tokio::sync::Mutex::new(())),
            pending_writes: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// A store bound to a backend, hydrated from its persisted state.
    ///
    /// When the persisted state cannot be read the store starts empty; the
    /// app stays usable offline.
    pub async fn open(backend: Arc<dyn PersistenceBackend>) -> Self {
        let state = match backend.load().await {
            Ok(state) => state,
            Err(err) => {
                log::warn!("persisted state unavailable, starting empty: {err}");
                StoredState::default()
            }
        };
        Self {
            habits: state.habits,
            profile: state.profile,
            backend: Some(backend),
            write_gate: Arc::new(tokio::sync::Mutex::new(())),
            pending_writes: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// All habits, in insertion order
    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    /// Look up a habit by id
    pub fn get(&self, id: Uuid) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    /// The user profile, if one has been set
    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Habits due on `date`, in insertion order
    pub fn list_due_on(&self, date: NaiveDate) -> Vec<&Habit> {
        self.habits
            .iter()
            .filter(|habit| habit.is_due_on(date))
            .collect()
    }

    /// Create a habit from a draft, applying the creation defaults.
    ///
    /// Refused with a validation error (and no collection change) when the
    /// draft has no usable name.
    pub fn create(&mut self, draft: &HabitDraft) -> Result<Habit> {
        let habit = Habit::from_draft(draft)?;
        let mut next = self.habits.clone();
        next.push(habit.clone());
        self.habits = next;
        self.persist_habits();
        Ok(habit)
    }

    /// Merge a draft over the habit with `id`.
    ///
    /// Fails with `NotFound` for an unknown id. The habit's identity and
    /// completion state are preserved; only [`Self::toggle_completion`]
    /// touches those.
    pub fn update(&mut self, id: Uuid, draft: &HabitDraft) -> Result<Habit> {
        let position = self.position_of(id)?;
        let updated = self.habits[position].merged_with(draft)?;
        let mut next = self.habits.clone();
        next[position] = updated.clone();
        self.habits = next;
        self.persist_habits();
        Ok(updated)
    }

    /// Delete the habit with `id`. Deleting an unknown id is a no-op.
    pub fn delete(&mut self, id: Uuid) {
        let next: Vec<Habit> = self
            .habits
            .iter()
            .filter(|habit| habit.id != id)
            .cloned()
            .collect();
        if next.len() != self.habits.len() {
            self.habits = next;
            self.persist_habits();
        }
    }

    /// Toggle completion of `date` on the habit with `id`
    pub fn toggle_completion(&mut self, id: Uuid, date: NaiveDate) -> Result<Habit> {
        let position = self.position_of(id)?;
        let toggled = self.habits[position].with_completion_toggled(date);
        let mut next = self.habits.clone();
        next[position] = toggled.clone();
        self.habits = next;
        self.persist_habits();
        Ok(toggled)
    }

    /// Set the user profile
    pub fn set_profile(&mut self, profile: UserProfile) {
        self.profile = Some(profile);
        self.persist_profile();
    }

    /// Write the current state through synchronously, after any writes
    /// still in flight
    pub async fn flush(&self) -> Result<()> {
        let in_flight: Vec<_> = match self.pending_writes.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => Vec::new(),
        };
        for handle in in_flight {
            let _ = handle.await;
        }

        if let Some(backend) = &self.backend {
            let _guard = self.write_gate.lock().await;
            backend.save_habits(&self.habits).await?;
            if let Some(profile) = &self.profile {
                backend.save_profile(profile).await?;
            }
        }
        Ok(())
    }

    fn position_of(&self, id: Uuid) -> Result<usize> {
        self.habits
            .iter()
            .position(|habit| habit.id == id)
            .ok_or_else(|| Error::not_found(format!("no habit with id {id}")))
    }

    fn persist_habits(&self) {
        let Some(backend) = &self.backend else {
            return;
        };
        let backend = Arc::clone(backend);
        let gate = Arc::clone(&self.write_gate);
        let snapshot = self.habits.clone();
        self.track_write(spawn_write(async move {
            let _guard = gate.lock().await;
            if let Err(err) = backend.save_habits(&snapshot).await {
                log::warn!("habit write failed, change kept in memory only: {err}");
            }
        }));
    }

    fn persist_profile(&self) {
        let (Some(backend), Some(profile)) = (&self.backend, &self.profile) else {
            return;
        };
        let backend = Arc::clone(backend);
        let gate = Arc::clone(&self.write_gate);
        let snapshot = profile.clone();
        self.track_write(spawn_write(async move {
            let _guard = gate.lock().await;
            if let Err(err) = backend.save_profile(&snapshot).await {
                log::warn!("profile write failed, change kept in memory only: {err}");
            }
        }));
    }

    fn track_write(&self, handle: Option<tokio::task::JoinHandle<()>>) {
        let Some(handle) = handle else {
            return;
        };
        if let Ok(mut pending) = self.pending_writes.lock() {
            pending.retain(|task| !task.is_finished());
            pending.push(handle);
        }
    }
}

fn spawn_write<F>(write: F) -> Option<tokio::task::JoinHandle<()>>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Some(handle.spawn(write)),
        Err(_) => {
            log::warn!("no async runtime, durability write skipped");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::{Category, RecurrenceMode};

    fn date(value: &str) -> NaiveDate {
        value.parse().unwrap()
    }

    #[test]
    fn create_applies_defaults_and_appends() {
        let mut store = HabitStore::new();
        let habit = store.create(&HabitDraft::named("Meditate")).unwrap();

        assert_eq!(store.habits().len(), 1);
        assert_eq!(habit.category, Category::Mindset);
        assert_eq!(habit.mode, RecurrenceMode::Recurring);
        assert_eq!(store.get(habit.id).unwrap().name, "Meditate");
    }

    #[test]
    fn create_with_blank_name_leaves_the_collection_unchanged() {
        let mut store = HabitStore::new();
        store.create(&HabitDraft::named("Meditate")).unwrap();

        let result = store.create(&HabitDraft::named("   "));

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(store.habits().len(), 1);
    }

    #[test]
    fn update_merges_and_preserves_completion_state() {
        let mut store = HabitStore::new();
        let habit = store.create(&HabitDraft::named("Run")).unwrap();
        store.toggle_completion(habit.id, date("2026-01-05")).unwrap();

        let updated = store
            .update(habit.id, &HabitDraft::named("Evening run"))
            .unwrap();

        assert_eq!(updated.id, habit.id);
        assert_eq!(updated.name, "Evening run");
        assert_eq!(updated.streak, 1);
        assert!(updated.is_completed_on(date("2026-01-05")));
        assert_eq!(updated.created_at, habit.created_at);
    }

    #[test]
    fn update_of_unknown_id_fails_loudly() {
        let mut store = HabitStore::new();
        let result = store.update(Uuid::new_v4(), &HabitDraft::named("Ghost"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = HabitStore::new();
        let habit = store.create(&HabitDraft::named("Run")).unwrap();

        store.delete(Uuid::new_v4());
        assert_eq!(store.habits().len(), 1);

        store.delete(habit.id);
        assert_eq!(store.habits().len(), 0);

        store.delete(habit.id);
        assert_eq!(store.habits().len(), 0);
    }

    #[test]
    fn toggle_on_unknown_id_fails_loudly() {
        let mut store = HabitStore::new();
        let result = store.toggle_completion(Uuid::new_v4(), date("2026-01-05"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn toggle_round_trip_restores_state() {
        let mut store = HabitStore::new();
        let habit = store.create(&HabitDraft::named("Run")).unwrap();

        store.toggle_completion(habit.id, date("2026-01-05")).unwrap();
        let restored = store
            .toggle_completion(habit.id, date("2026-01-05"))
            .unwrap();

        assert_eq!(restored.streak, 0);
        assert!(restored.completed_dates.is_empty());
    }

    #[test]
    fn due_listing_keeps_insertion_order() {
        let mut store = HabitStore::new();
        // 2026-01-05 is a Monday
        let first = store
            .create(&HabitDraft::named("Late run").with_days_of_week([1]).with_time("21:00"))
            .unwrap();
        let second = store
            .create(&HabitDraft::named("Early run").with_days_of_week([1]).with_time("06:00"))
            .unwrap();
        store
            .create(&HabitDraft::named("Sunday rest").with_days_of_week([0]))
            .unwrap();

        let due = store.list_due_on(date("2026-01-05"));
        let ids: Vec<Uuid> = due.iter().map(|habit| habit.id).collect();

        // Insertion order, not time-of-day order
        assert_eq!(ids, vec![first.id, second.id]);
    }
}
