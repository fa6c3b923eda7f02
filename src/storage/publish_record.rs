use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::types::{PublishedItem, StateError};
use crate::util::atomic_write;

/// URLs already published, keyed by entry URL.
///
/// Persisted as a JSON object of the form
/// `{"<url>": {"published_time": "<RFC 3339>"}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublishRecord {
    items: BTreeMap<String, PublishedItem>,
}

impl PublishRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the record from `path`.
    ///
    /// - Missing file → empty record
    /// - Empty or whitespace-only file → empty record
    /// - Malformed JSON → `Err(StateError::Json)`
    pub fn load(path: &Path) -> Result<Self, StateError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No publish record found, starting empty");
                return Ok(Self::default());
            }
            Err(e) => return Err(StateError::io(path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let record: PublishRecord =
            serde_json::from_str(&content).map_err(|source| StateError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), records = record.len(), "Loaded publish record");
        Ok(record)
    }

    /// Write the record to `path`, replacing any previous contents atomically.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let json = serde_json::to_vec_pretty(self).map_err(|source| StateError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        atomic_write(path, &json).map_err(|e| StateError::io(path, e))?;
        tracing::debug!(path = %path.display(), records = self.len(), "Saved publish record");
        Ok(())
    }

    /// Drop every record whose age relative to `now` is at least `window`.
    ///
    /// Returns the number of records removed.
    pub fn prune(&mut self, now: DateTime<Utc>, window: TimeDelta) -> usize {
        let before = self.items.len();
        self.items
            .retain(|_, item| now.signed_duration_since(item.published_time) < window);
        before - self.items.len()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.items.contains_key(url)
    }

    /// Mark `url` as published at `at`, overwriting any earlier time.
    pub fn insert(&mut self, url: impl Into<String>, at: DateTime<Utc>) {
        self.items
            .insert(url.into(), PublishedItem { published_time: at });
    }

    pub fn get(&self, url: &str) -> Option<&PublishedItem> {
        self.items.get(url)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PublishedItem)> {
        self.items.iter().map(|(url, item)| (url.as_str(), item))
    }
}

// ============================================================================
// Tests
// ============================================================================
