use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Outcome badge of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogStatus {
    #[serde(rename = "OK")]
    Ok,
    Warning,
}

impl LogStatus {
    /// Even rows are OK, odd rows are warnings.
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 { Self::Ok } else { Self::Warning }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "Warning",
        }
    }
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the Logs page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Local time, `HH:MM`.
    pub time: String,
    pub event: String,
    pub operator: String,
    pub status: LogStatus,
}

/// Error type for log fetches.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("unexpected status: {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Anything that can produce log entries.
pub trait LogSource: Send + Sync {
    fn name(&self) -> &str;

    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Vec<LogEntry>, LogError>> + Send + '_>>;
}

/// Mock source for tests. Returns fixed entries or fails.
#[derive(Debug, Clone)]
pub struct MockSource {
    pub entries: Vec<LogEntry>,
    pub fail: bool,
}

impl MockSource {
    pub fn new(entries: Vec<LogEntry>) -> Self {
        Self { entries, fail: false }
    }

    /// A source whose every fetch fails.
    pub fn failing() -> Self {
        Self { entries: Vec::new(), fail: true }
    }
}

impl LogSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Vec<LogEntry>, LogError>> + Send + '_>> {
        let entries = self.entries.clone();
        let fail = self.fail;
        Box::pin(async move {
            if fail {
                Err(LogError::RequestFailed("mock failure".into()))
            } else {
                Ok(entries)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(i: usize) -> LogEntry {
        LogEntry {
            time: "12:00".into(),
            event: format!("Module diagnostics Suite {i}"),
            operator: format!("op{i}"),
            status: LogStatus::for_index(i),
        }
    }

    #[tokio::test]
    async fn mock_source_returns_entries() {
        let mock = MockSource::new(vec![entry(0), entry(1)]);
        let got = mock.fetch().await.unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[1].status, LogStatus::Warning);
        assert_eq!(mock.name(), "mock");
    }

    #[tokio::test]
    async fn failing_mock_errors() {
        let err = MockSource::failing().fetch().await.unwrap_err();
        assert!(err.to_string().contains("mock failure"));
    }

    #[test]
    fn status_alternates() {
        let statuses: Vec<&str> = (0..4).map(|i| LogStatus::for_index(i).as_str()).collect();
        assert_eq!(statuses, vec!["OK", "Warning", "OK", "Warning"]);
    }

    #[test]
    fn status_serializes_like_badge() {
        assert_eq!(serde_json::to_string(&LogStatus::Ok).unwrap(), "\"OK\"");
        assert_eq!(serde_json::to_string(&LogStatus::Warning).unwrap(), "\"Warning\"");
    }
}
