//! Hosted table-sync collaborator client for Growth Space
//!
//! Talks to a Supabase-style backend: an auth endpoint for the session
//! prerequisite plus two per-user tables, `habits` (upserted by `id`,
//! last-write-wins) and `user_profiles` (upserted by `user_id`). Record
//! payloads stay generic here; the application supplies its own wire
//! envelope types.

mod session;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use url::Url;

pub use session::{Session, User};

const HABITS_TABLE: &str = "habits";
const PROFILES_TABLE: &str = "user_profiles";

/// Error type for sync backend calls
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("API error: {message} (Status: {status})")]
    Api {
        message: String,
        status: reqwest::StatusCode,
    },

    #[error("Missing session")]
    MissingSession,
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Client for the hosted persistence backend
pub struct SyncClient {
    base_url: String,
    api_key: String,
    http_client: Client,
    current_session: Arc<RwLock<Option<Session>>>,
}

impl SyncClient {
    /// Create a new sync client
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self::with_http_client(base_url, api_key, Client::new())
    }

    /// Create a new sync client reusing an existing HTTP client
    pub fn with_http_client(base_url: &str, api_key: &str, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http_client,
            current_session: Arc::new(RwLock::new(None)),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| SyncError::Url(url::ParseError::EmptyHost))?
            .extend(segments);
        Ok(url)
    }

    fn bearer_token(&self) -> String {
        self.current_session
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|s| s.access_token.clone()))
            .unwrap_or_else(|| self.api_key.clone())
    }

    async fn error_from(response: reqwest::Response) -> SyncError {
        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        SyncError::Api { message, status }
    }

    // ----- auth -----

    async fn session_request(&self, url: Url, email: &str, password: &str) -> Result<Session> {
        let response = self
            .http_client
            .post(url)
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Auth(format!("{message} (Status: {status})")));
        }

        let mut session = response.json::<Session>().await?;
        session.anchor_expiry();

        if let Ok(mut guard) = self.current_session.write() {
            *guard = Some(session.clone());
        }
        Ok(session)
    }

    /// Register a new user and open a session
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        let url = self.endpoint(&["auth", "v1", "signup"])?;
        self.session_request(url, email, password).await
    }

    /// Sign in with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let mut url = self.endpoint(&["auth", "v1", "token"])?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        self.session_request(url, email, password).await
    }

    /// Close the current session.
    ///
    /// The local session is cleared even when the backend call fails; the
    /// token simply expires server-side in that case.
    pub async fn sign_out(&self) -> Result<()> {
        let token = {
            let guard = self
                .current_session
                .read()
                .map_err(|_| SyncError::MissingSession)?;
            guard
                .as_ref()
                .map(|s| s.access_token.clone())
                .ok_or(SyncError::MissingSession)?
        };

        let url = self.endpoint(&["auth", "v1", "logout"])?;
        let result = self
            .http_client
            .post(url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await;

        if let Ok(mut guard) = self.current_session.write() {
            *guard = None;
        }

        match result {
            Ok(response) if !response.status().is_success() => {
                log::warn!(
                    "sign-out rejected by backend (status {}), session cleared locally",
                    response.status()
                );
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(err) => Err(SyncError::Request(err)),
        }
    }

    /// The current session, if one has been established
    pub fn current_session(&self) -> Option<Session> {
        self.current_session.read().ok().and_then(|g| g.clone())
    }

    /// The signed-in user id, if a session exists
    pub fn user_id(&self) -> Option<String> {
        self.current_session().map(|s| s.user.id)
    }

    // ----- tables -----

    async fn upsert<T: Serialize>(&self, table: &str, conflict_key: &str, records: &T) -> Result<()> {
        let mut url = self.endpoint(&["rest", "v1", table])?;
        url.query_pairs_mut().append_pair("on_conflict", conflict_key);

        let response = self
            .http_client
            .post(url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.bearer_token()))
            .header("Prefer", "resolution=merge-duplicates")
            .json(records)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        table: &str,
        user_id: &str,
        order: Option<&str>,
    ) -> Result<Vec<T>> {
        let mut url = self.endpoint(&["rest", "v1", table])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            pairs.append_pair("user_id", &format!("eq.{user_id}"));
            if let Some(order) = order {
                pairs.append_pair("order", order);
            }
        }

        let response = self
            .http_client
            .get(url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.bearer_token()))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json::<Vec<T>>().await?)
    }

    /// Upsert habit records for a user, keyed by `id` (last write wins)
    pub async fn upsert_habits<T: Serialize>(&self, records: &[T]) -> Result<()> {
        self.upsert(HABITS_TABLE, "id", &records).await
    }

    /// Fetch all habit records for a user, newest creation first
    pub async fn fetch_habits<T: DeserializeOwned>(&self, user_id: &str) -> Result<Vec<T>> {
        self.fetch(HABITS_TABLE, user_id, Some("createdAt.desc")).await
    }

    /// Upsert the profile record for a user, keyed by `user_id`
    pub async fn upsert_profile<T: Serialize>(&self, record: &T) -> Result<()> {
        self.upsert(PROFILES_TABLE, "user_id", record).await
    }

    /// Fetch the profile record for a user, if present
    pub async fn fetch_profile<T: DeserializeOwned>(&self, user_id: &str) -> Result<Option<T>> {
        let mut rows = self.fetch::<T>(PROFILES_TABLE, user_id, None).await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }
}
