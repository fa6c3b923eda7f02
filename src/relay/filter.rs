//! Eligibility decisions for polled entries.
//!
//! Each entry gets exactly one [`Verdict`]; the checks run in a fixed order
//! and the first match wins:
//!
//! 1. title contains the sticky marker
//! 2. older than the retention window
//! 3. URL already in the publish record
//! 4. otherwise eligible
use chrono::{DateTime, TimeDelta, Utc};

use crate::feed::FeedEntry;
use crate::storage::PublishRecord;

/// Parameters for [`evaluate`] and [`select_eligible`].
#[derive(Debug, Clone)]
pub struct FilterRules {
    /// Substring identifying the subreddit's recurring discussion thread.
    pub sticky_marker: String,
    /// Entries older than this are never published.
    pub retention_window: TimeDelta,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            sticky_marker: "General Discussion - Daily Thread".to_string(),
            retention_window: TimeDelta::hours(24),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Sticky,
    Stale { age: TimeDelta },
    AlreadyPublished,
    Eligible,
}

pub fn evaluate(
    entry: &FeedEntry,
    records: &PublishRecord,
    now: DateTime<Utc>,
    rules: &FilterRules,
) -> Verdict {
    if !rules.sticky_marker.is_empty() && entry.title.contains(&rules.sticky_marker) {
        return Verdict::Sticky;
    }

    let age = now.signed_duration_since(entry.published);
    if age > rules.retention_window {
        return Verdict::Stale { age };
    }

    if records.contains(&entry.link) {
        return Verdict::AlreadyPublished;
    }

    Verdict::Eligible
}

/// Entries that passed the filter, plus per-reason skip counts.
#[derive(Debug, Default)]
pub struct Selection<'a> {
    /// Eligible entries in feed order.
    pub eligible: Vec<&'a FeedEntry>,
    pub sticky: usize,
    pub stale: usize,
    pub duplicate: usize,
}

impl Selection<'_> {
    pub fn skipped(&self) -> usize {
        self.sticky + self.stale + self.duplicate
    }
}

/// Run [`evaluate`] over `entries`, logging every skip.
///
/// `last_fetch` only feeds the stale-skip log line.
pub fn select_eligible<'a>(
    entries: &'a [FeedEntry],
    records: &PublishRecord,
    now: DateTime<Utc>,
    last_fetch: DateTime<Utc>,
    rules: &FilterRules,
) -> Selection<'a> {
    let mut selection = Selection::default();

    for entry in entries {
        match evaluate(entry, records, now, rules) {
            Verdict::Sticky => {
                tracing::info!(title = %entry.title, "Skipping discussion thread");
                selection.sticky += 1;
            }
            Verdict::Stale { age } => {
                tracing::info!(
                    link = %entry.link,
                    age_secs = age.num_seconds(),
                    window_secs = rules.retention_window.num_seconds(),
                    since_last_fetch_secs = now.signed_duration_since(last_fetch).num_seconds(),
                    "Skipping entry older than retention window"
                );
                selection.stale += 1;
            }
            Verdict::AlreadyPublished => {
                tracing::info!(link = %entry.link, "Skipping already published entry");
                selection.duplicate += 1;
            }
            Verdict::Eligible => selection.eligible.push(entry),
        }
    }

    selection
}
