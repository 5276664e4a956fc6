//! Session management for the sync backend

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Authenticated user as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// An authenticated session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The access token
    pub access_token: String,

    /// The refresh token
    pub refresh_token: String,

    /// The token type, normally `bearer`
    pub token_type: String,

    /// Seconds until the access token expires
    pub expires_in: i64,

    /// Absolute expiry timestamp (Unix seconds)
    #[serde(default)]
    pub expires_at: Option<i64>,

    /// The user this session belongs to
    pub user: User,
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs() as i64
}

impl Session {
    /// Fill in `expires_at` from `expires_in` when the backend omitted it
    pub(crate) fn anchor_expiry(&mut self) {
        if self.expires_at.is_none() {
            self.expires_at = Some(unix_now() + self.expires_in);
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => unix_now() >= expires_at,
            None => false,
        }
    }
}
