//! Local persistence: one JSON document on disk
//!
//! The document holds the two fixed logical keys the app has always used,
//! `mgs_profile` and `mgs_habits`. Each write overwrites a whole key; the
//! document is read once at startup. A missing or corrupt document loads
//! as empty state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

use super::{PersistenceBackend, StoredState};
use crate::error::Result;
use crate::habit::Habit;
use crate::profile::UserProfile;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LocalDocument {
    #[serde(rename = "mgs_profile", default, skip_serializing_if = "Option::is_none")]
    profile: Option<UserProfile>,
    #[serde(rename = "mgs_habits", default)]
    habits: Vec<Habit>,
}

/// File-backed persistence for single-device use
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Create a store backed by the document at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The document path
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn read_document(&self) -> LocalDocument {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(_) => return LocalDocument::default(),
        };
        match serde_json::from_slice(&raw) {
            Ok(document) => document,
            Err(err) => {
                log::warn!(
                    "discarding unreadable habit document at {}: {err}",
                    self.path.display()
                );
                LocalDocument::default()
            }
        }
    }

    async fn write_document(&self, document: &LocalDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let raw = serde_json::to_vec_pretty(document)?;
        fs::write(&self.path, raw).await?;
        Ok(())
    }
}

#[async_trait]
impl PersistenceBackend for LocalStore {
    async fn load(&self) -> Result<StoredState> {
        let document = self.read_document().await;
        Ok(StoredState {
            profile: document.profile,
            habits: document.habits,
        })
    }

    async fn save_habits(&self, habits: &[Habit]) -> Result<()> {
        let mut document = self.read_document().await;
        document.habits = habits.to_vec();
        self.write_document(&document).await
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        let mut document = self.read_document().await;
        document.profile = Some(profile.clone());
        self.write_document(&document).await
    }
}
