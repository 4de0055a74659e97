//! Persisted usage counters.
//!
//! The store is a plain JSON document inside the skill directory. It is read
//! once per run, mutated in memory by each analysis step, and rewritten in
//! full on save. Nothing coordinates concurrent runs: the last writer wins.

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Token -> occurrence count. Ordered so the JSON output is stable.
pub type FrequencyMap = BTreeMap<String, u64>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("counters file {path} is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One raw feedback line with the time it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub timestamp: String,
    pub content: String,
}

impl FeedbackRecord {
    pub fn now(content: &str) -> Self {
        Self {
            timestamp: iso_timestamp(),
            content: content.to_string(),
        }
    }
}

/// On-disk layout of the counters file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterData {
    #[serde(default)]
    pub query_patterns: FrequencyMap,
    #[serde(default)]
    pub module_usage: FrequencyMap,
    #[serde(default)]
    pub error_patterns: FrequencyMap,
    #[serde(default)]
    pub missing_apis: Vec<String>,
    #[serde(default)]
    pub feedback: Vec<FeedbackRecord>,
    #[serde(default)]
    pub last_update: Option<String>,
}

/// Counters bound to the file they were loaded from.
#[derive(Debug, Clone)]
pub struct CounterStore {
    path: PathBuf,
    feedback_limit: Option<usize>,
    pub data: CounterData,
}

impl CounterStore {
    /// Read the counters file, or start empty if it doesn't exist yet.
    ///
    /// A file that exists but doesn't parse is an error and is left untouched.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read counters file: {}", path.display()))?;
            let data: CounterData =
                serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
                    path: path.clone(),
                    source,
                })?;
            debug!(
                "Loaded counters from {} ({} feedback records)",
                path.display(),
                data.feedback.len()
            );
            data
        } else {
            debug!("No counters file at {}, starting empty", path.display());
            CounterData::default()
        };

        Ok(Self {
            path,
            feedback_limit: None,
            data,
        })
    }

    /// Keep at most `limit` feedback records (newest) when saving.
    pub fn with_feedback_limit(mut self, limit: Option<usize>) -> Self {
        self.feedback_limit = limit;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stamp `last_update` and overwrite the counters file.
    pub fn save(&mut self) -> Result<()> {
        self.data.last_update = Some(iso_timestamp());

        if let Some(limit) = self.feedback_limit {
            let len = self.data.feedback.len();
            if len > limit {
                self.data.feedback.drain(0..len - limit);
                debug!("Dropped {} old feedback records", len - limit);
            }
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write counters file: {}", self.path.display()))?;

        info!("Learning data saved to {}", self.path.display());
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.data.module_usage.is_empty()
            && self.data.query_patterns.is_empty()
            && self.data.error_patterns.is_empty()
    }
}

/// Local time in ISO-8601 form, e.g. `2025-03-01T14:02:11.123456`.
pub fn iso_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = CounterStore::load(dir.path().join(".learning_data.json")).unwrap();
        assert!(store.is_empty());
        assert!(store.data.feedback.is_empty());
        assert!(store.data.missing_apis.is_empty());
        assert!(store.data.last_update.is_none());
    }

    #[test]
    fn test_save_sets_last_update() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = CounterStore::load(dir.path().join("c.json")).unwrap();
        store.save().unwrap();
        assert!(store.data.last_update.is_some());

        let raw = fs::read_to_string(dir.path().join("c.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        for key in [
            "query_patterns",
            "module_usage",
            "error_patterns",
            "missing_apis",
            "feedback",
            "last_update",
        ] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("c.json");
        let mut store = CounterStore::load(&path).unwrap();
        store.data.module_usage.insert("VPSS".to_string(), 3);
        store
            .data
            .query_patterns
            .insert("CVI_VPSS_SetChnAttr".to_string(), 2);
        store
            .data
            .error_patterns
            .insert("bind failed".to_string(), 1);
        store.data.feedback.push(FeedbackRecord::now("bind failed"));
        store.save().unwrap();

        let reloaded = CounterStore::load(&path).unwrap();
        assert_eq!(reloaded.data, store.data);
    }

    #[test]
    fn test_malformed_json_is_typed_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("c.json");
        fs::write(&path, "{ not json").unwrap();

        let err = CounterStore::load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Malformed { .. })
        ));
        // Left as-is for the user to inspect
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_missing_keys_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("c.json");
        fs::write(&path, r#"{"module_usage": {"VI": 4}}"#).unwrap();

        let store = CounterStore::load(&path).unwrap();
        assert_eq!(store.data.module_usage.get("VI"), Some(&4));
        assert!(store.data.query_patterns.is_empty());
        assert!(store.data.feedback.is_empty());
    }

    #[test]
    fn test_feedback_limit_keeps_newest() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = CounterStore::load(dir.path().join("c.json"))
            .unwrap()
            .with_feedback_limit(Some(2));
        for line in ["one", "two", "three"] {
            store.data.feedback.push(FeedbackRecord::now(line));
        }
        store.save().unwrap();

        let contents: Vec<&str> = store
            .data
            .feedback
            .iter()
            .map(|r| r.content.as_str())
            .collect();
        assert_eq!(contents, vec!["two", "three"]);
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("c.json");
        let mut store = CounterStore::load(&path).unwrap();
        store.save().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_iso_timestamp_shape() {
        let ts = iso_timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
    }
}
