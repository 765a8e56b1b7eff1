//! Persisted monitor cursor.
//!
//! The state file is a single JSON object that is read at startup and
//! replaced wholesale after every check cycle.
use chrono::{DateTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

use crate::error::Result;

/// One release that produced a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedRelease {
    pub tag: String,
    pub processed_at: DateTime<Utc>,
    pub release_id: u64,
}

/// Cursor tracking which upstream releases have been handled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorState {
    pub last_checked_release: Option<u64>,
    pub last_processed_tag: Option<String>,
    pub processed_releases: Vec<ProcessedRelease>,
    pub last_check_time: Option<DateTime<Utc>>,
}

impl MonitorState {
    /// A release is new iff its tag differs from the last processed one.
    pub fn is_new_release(&self, tag: &str) -> bool {
        self.last_processed_tag.as_deref() != Some(tag)
    }

    /// Record a handled release and advance the cursor.
    pub fn record_processed(
        &mut self,
        tag: &str,
        release_id: u64,
        now: DateTime<Utc>,
    ) {
        self.last_processed_tag = Some(tag.to_string());
        self.last_checked_release = Some(release_id);
        self.processed_releases.push(ProcessedRelease {
            tag: tag.to_string(),
            processed_at: now,
            release_id,
        });
        self.last_check_time = Some(now);
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_check_time = Some(now);
    }
}

/// Loads and saves [`MonitorState`] at a fixed path.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the state file. Missing or corrupt files yield the default state.
    pub async fn load(&self) -> MonitorState {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                debug!(
                    "state file {} not readable ({}): starting fresh",
                    self.path.display(),
                    e
                );
                return MonitorState::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    "state file {} is corrupt ({}): starting fresh",
                    self.path.display(),
                    e
                );
                MonitorState::default()
            }
        }
    }

    /// Write the state atomically: a sibling temp file is written first and
    /// then renamed over the target.
    pub async fn save(&self, state: &MonitorState) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let mut tmp_name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state.json".into());
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&tmp_path, content).await?;
        fs::rename(&tmp_path, &self.path).await?;

        debug!("saved state to {}", self.path.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::TempDir;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn missing_file_yields_default_state() {
        let tmp = TempDir::new().unwrap();
        let store = StateStore::new(tmp.path().join(".release-state.json"));

        let state = store.load().await;

        assert_eq!(state, MonitorState::default());
    }

    #[tokio::test]
    async fn corrupt_file_yields_default_state() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".release-state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let state = StateStore::new(path).load().await;

        assert_eq!(state, MonitorState::default());
    }

    #[tokio::test]
    async fn round_trips_unchanged() {
        let tmp = TempDir::new().unwrap();
        let store = StateStore::new(tmp.path().join("nested/state.json"));

        let mut state = MonitorState::default();
        state.record_processed("0.2.0", 11, now());
        state.record_processed("0.3.0", 12, now());

        store.save(&state).await.unwrap();
        let loaded = store.load().await;

        assert_eq!(loaded, state);
        assert!(!tmp.path().join("nested/state.json.tmp").exists());
    }

    #[tokio::test]
    async fn reads_camel_case_state_files() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".release-state.json");
        std::fs::write(
            &path,
            r#"{
  "lastCheckedRelease": 228540111,
  "lastProcessedTag": "0.2.0",
  "processedReleases": [
    { "tag": "0.2.0", "processedAt": "2025-06-20T10:00:00.000Z", "releaseId": 228540111 }
  ],
  "lastCheckTime": "2025-06-20T10:30:00.000Z"
}"#,
        )
        .unwrap();

        let state = StateStore::new(path).load().await;

        assert_eq!(state.last_processed_tag.as_deref(), Some("0.2.0"));
        assert_eq!(state.processed_releases.len(), 1);
        assert!(!state.is_new_release("0.2.0"));
        assert!(state.is_new_release("0.3.0"));
    }

    #[test]
    fn touch_only_updates_check_time() {
        let mut state = MonitorState::default();
        state.record_processed("0.2.0", 1, now());
        let before = state.clone();

        let later = Utc.with_ymd_and_hms(2025, 7, 2, 0, 0, 0).unwrap();
        state.touch(later);

        assert_eq!(state.processed_releases, before.processed_releases);
        assert_eq!(state.last_processed_tag, before.last_processed_tag);
        assert_eq!(state.last_check_time, Some(later));
    }
}
