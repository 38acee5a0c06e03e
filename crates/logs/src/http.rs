//! HTTP log source.
//!
//! Reads a public placeholder user listing and repurposes the first few
//! records as diagnostics log rows. The data has nothing to do with the
//! battery; it only fills the Logs page.

use crate::source::{LogEntry, LogError, LogSource, LogStatus};
use chrono::{DateTime, Local, TimeDelta};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;

/// Default user listing endpoint.
pub const DEFAULT_URL: &str = "https://jsonplaceholder.typicode.com/users";
/// Only the first records are shown.
pub const MAX_ENTRIES: usize = 6;
/// Gap between consecutive synthetic timestamps.
pub const ENTRY_SPACING_MINUTES: i64 = 10;

// ── Placeholder API types ──

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub username: String,
    pub address: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Address {
    pub suite: String,
}

/// Turn user records into log rows. Entry `i` is stamped `now - i * 10 min`.
pub fn project(users: Vec<User>, now: DateTime<Local>) -> Vec<LogEntry> {
    users
        .into_iter()
        .take(MAX_ENTRIES)
        .enumerate()
        .map(|(i, user)| {
            let stamp = now - TimeDelta::minutes(ENTRY_SPACING_MINUTES * i as i64);
            LogEntry {
                time: stamp.format("%H:%M").to_string(),
                event: format!("Module diagnostics {}", user.address.suite),
                operator: user.username,
                status: LogStatus::for_index(i),
            }
        })
        .collect()
}

// ── Source ──

/// Fetches the user listing over HTTP.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    /// Build with an optional URL override.
    pub fn new(url: Option<String>) -> Self {
        let url = url.unwrap_or_else(|| DEFAULT_URL.to_owned());
        Self {
            client: reqwest::Client::new(),
            url: url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }

    async fn fetch_users(&self) -> Result<Vec<LogEntry>, LogError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LogError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LogError::Status(resp.status().as_u16()));
        }

        let users: Vec<User> = resp
            .json()
            .await
            .map_err(|e| LogError::Decode(e.to_string()))?;

        tracing::debug!(count = users.len(), url = %self.url, "user listing fetched");
        Ok(project(users, Local::now()))
    }
}

impl LogSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Vec<LogEntry>, LogError>> + Send + '_>> {
        Box::pin(self.fetch_users())
    }
}

/// Build a source from the environment.
/// Reads `ROBOBAT_LOGS_URL`, falling back to the public placeholder API.
pub fn from_env() -> HttpSource {
    HttpSource::new(std::env::var("ROBOBAT_LOGS_URL").ok())
}
