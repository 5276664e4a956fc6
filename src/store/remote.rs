//! Remote persistence: per-user records on the hosted tables
//!
//! Habit records are upserted keyed by `id` (last write wins) and read back
//! newest-creation-first; the profile record is upserted keyed by
//! `user_id`. Each record wraps the plain wire shape in a per-user
//! envelope, mirroring what the hosted tables store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use growth_space_sync::SyncClient;

use super::{PersistenceBackend, StoredState};
use crate::error::{Error, Result};
use crate::habit::Habit;
use crate::profile::UserProfile;

/// Per-user envelope around a habit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitRecord {
    #[serde(flatten)]
    pub habit: Habit,
    pub user_id: String,
    pub updated_at: DateTime<Utc>,
}

/// Per-user envelope around the profile record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub user_id: String,
    pub updated_at: DateTime<Utc>,
}

/// Backend that syncs state to the hosted tables for one signed-in user
pub struct RemoteStore {
    client: Arc<SyncClient>,
    user_id: String,
}

impl RemoteStore {
    /// Create a backend for an explicit user id
    pub fn new(client: Arc<SyncClient>, user_id: &str) -> Self {
        Self {
            client,
            user_id: user_id.to_string(),
        }
    }

    /// Create a backend for the client's current session
    pub fn for_current_session(client: Arc<SyncClient>) -> Result<Self> {
        let user_id = client
            .user_id()
            .ok_or_else(|| Error::collaborator("no active session"))?;
        Ok(Self { client, user_id })
    }
}

#[async_trait]
impl PersistenceBackend for RemoteStore {
    async fn load(&self) -> Result<StoredState> {
        let records: Vec<HabitRecord> = self.client.fetch_habits(&self.user_id).await?;
        let profile: Option<ProfileRecord> = self.client.fetch_profile(&self.user_id).await?;
        Ok(StoredState {
            profile: profile.map(|record| record.profile),
            habits: records.into_iter().map(|record| record.habit).collect(),
        })
    }

    async fn save_habits(&self, habits: &[Habit]) -> Result<()> {
        let now = Utc::now();
        let records: Vec<HabitRecord> = habits
            .iter()
            .map(|habit| HabitRecord {
                habit: habit.clone(),
                user_id: self.user_id.clone(),
                updated_at: now,
            })
            .collect();
        self.client.upsert_habits(&records).await?;
        Ok(())
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        let record = ProfileRecord {
            profile: profile.clone(),
            user_id: self.user_id.clone(),
            updated_at: Utc::now(),
        };
        self.client.upsert_profile(&record).await?;
        Ok(())
    }
}
