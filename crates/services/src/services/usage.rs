//! Append-only usage-snapshot log, consumed by the chat assistant for
//! context. Best effort: callers log failures and move on, never blocking
//! the action the snapshot was attached to.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UsageLogError {
    #[error("failed to write usage log: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode usage snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Client-reported usage snapshot. The payload is passed through opaquely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub session_id: Option<String>,
    pub user_id: Option<Uuid>,
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct UsageRecord<'a> {
    received_at: DateTime<Utc>,
    #[serde(flatten)]
    snapshot: &'a UsageSnapshot,
}

pub struct UsageLogger {
    path: PathBuf,
}

impl UsageLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Appends the snapshot as one JSON line. Each record carries a
    /// server-side receive timestamp.
    pub async fn append(&self, snapshot: &UsageSnapshot) -> Result<(), UsageLogError> {
        let record = UsageRecord {
            received_at: Utc::now(),
            snapshot,
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(path = %self.path.display(), "appended usage snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_writes_one_json_line_per_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.jsonl");
        let logger = UsageLogger::new(&path);

        for plants in [1, 2] {
            logger
                .append(&UsageSnapshot {
                    session_id: Some("sess-1".to_string()),
                    user_id: Some(Uuid::new_v4()),
                    payload: serde_json::json!({ "total_plants": plants }),
                })
                .await
                .unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["payload"]["total_plants"], 1);
        assert_eq!(first["session_id"], "sess-1");
        assert!(first["received_at"].is_string());
    }

    #[tokio::test]
    async fn test_append_fails_cleanly_on_bad_path() {
        let logger = UsageLogger::new("/nonexistent-dir/usage.jsonl");
        let err = logger
            .append(&UsageSnapshot {
                session_id: None,
                user_id: None,
                payload: serde_json::Value::Null,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UsageLogError::Io(_)));
    }
}
