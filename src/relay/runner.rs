use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::time::Duration;

use super::domain::{registrable_domain, IgnoreList};
use super::extract::format_and_extract;
use super::filter::select_eligible;
use crate::config::{Config, Credentials};
use crate::feed::{fetch_feed, FeedEntry};
use crate::forum::{CommunityId, LemmyClient, NewPost};
use crate::storage::{LastFetchMarker, PublishRecord};
use crate::util::unescape_html;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Log what would be posted without posting or touching state files.
    pub dry_run: bool,
}

/// Per-run counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub fetched: usize,
    pub sticky: usize,
    pub stale: usize,
    pub duplicate: usize,
    pub ignored: usize,
    pub published: usize,
    /// Publish records dropped for age before filtering.
    pub pruned: usize,
}

impl RunReport {
    pub fn skipped(&self) -> usize {
        self.sticky + self.stale + self.duplicate + self.ignored
    }
}

/// Build the HTTP client shared by the feed fetch and the Lemmy API.
pub fn build_http_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .build()
        .context("Failed to build HTTP client")
}

/// Poll the feed once and relay every eligible entry.
///
/// The publish record is saved once, after the last post. If a post fails
/// the record is still saved with everything published before the failure,
/// then the error is returned.
pub async fn run_once(
    config: &Config,
    credentials: &Credentials,
    options: RunOptions,
) -> Result<RunReport> {
    let http = build_http_client(config)?;
    let mut forum = LemmyClient::new(http.clone(), &config.instance_url)
        .context("Invalid Lemmy instance URL")?;
    forum
        .login(&credentials.username, &credentials.password)
        .await
        .context("Failed to log in to Lemmy")?;

    let last_fetch_path = config.last_fetch_path();
    let last_fetch =
        LastFetchMarker::read(&last_fetch_path, Utc::now(), config.last_fetch_offset())
            .context("Failed to read last-fetch marker")?;

    let community_id = forum
        .discover_community(&config.community)
        .await
        .with_context(|| format!("Failed to look up community '{}'", config.community))?;

    let feed = fetch_feed(&http, &config.feed_url)
        .await
        .with_context(|| format!("Failed to fetch feed {}", config.feed_url))?;
    let now = Utc::now();

    tracing::info!(
        entries = feed.entries.len(),
        since_last_fetch_secs = now.signed_duration_since(last_fetch).num_seconds(),
        "Polled feed"
    );

    if !options.dry_run {
        LastFetchMarker::write(&last_fetch_path, now)
            .context("Failed to write last-fetch marker")?;
    }

    let record_path = config.publish_record_path();
    let mut records = PublishRecord::load(&record_path).context("Failed to load publish record")?;
    let pruned = records.prune(now, config.retention_window());
    if pruned > 0 {
        tracing::info!(pruned = pruned, remaining = records.len(), "Pruned expired publish records");
    }

    let ignore = IgnoreList::load(&config.ignore_list).with_context(|| {
        format!("Failed to read ignore list {}", config.ignore_list.display())
    })?;

    let selection = select_eligible(
        &feed.entries,
        &records,
        now,
        last_fetch,
        &config.filter_rules(),
    );

    let mut report = RunReport {
        fetched: feed.entries.len(),
        sticky: selection.sticky,
        stale: selection.stale,
        duplicate: selection.duplicate,
        pruned,
        ..RunReport::default()
    };

    let publisher = Publisher {
        forum: &forum,
        community_id,
        ignore: &ignore,
        post_delay: config.post_delay(),
        dry_run: options.dry_run,
    };
    let outcome = publisher
        .publish_all(&selection.eligible, &mut records, &mut report)
        .await;

    if !options.dry_run {
        let saved = records.save(&record_path);
        if let Err(e) = &outcome {
            if let Err(save_err) = saved {
                tracing::error!(error = %save_err, "Failed to save publish record after publish error");
            }
            tracing::error!(error = %e, published = report.published, "Run aborted mid-batch");
        } else {
            saved.context("Failed to save publish record")?;
        }
    }
    outcome?;

    tracing::info!(
        fetched = report.fetched,
        published = report.published,
        skipped = report.skipped(),
        ignored = report.ignored,
        dry_run = options.dry_run,
        "Run complete"
    );
    Ok(report)
}

struct Publisher<'a> {
    forum: &'a LemmyClient,
    community_id: CommunityId,
    ignore: &'a IgnoreList,
    post_delay: Duration,
    dry_run: bool,
}

impl Publisher<'_> {
    async fn publish_all(
        &self,
        entries: &[&FeedEntry],
        records: &mut PublishRecord,
        report: &mut RunReport,
    ) -> Result<()> {
        // Dry runs never touch `records`, so repeats are tracked here
        let mut previewed: HashSet<&str> = HashSet::new();

        for entry in entries {
            // The same link can appear twice in one poll
            if records.contains(&entry.link) || previewed.contains(entry.link.as_str()) {
                tracing::info!(link = %entry.link, "Skipping already published entry");
                report.duplicate += 1;
                continue;
            }

            let extracted = format_and_extract(&entry.summary);
            let domain = registrable_domain(extracted.url.as_deref());
            if self.ignore.is_ignored(domain.as_deref()) {
                tracing::info!(
                    link = %entry.link,
                    domain = domain.as_deref().unwrap_or_default(),
                    "Skipping entry from ignored domain"
                );
                report.ignored += 1;
                continue;
            }

            let post = NewPost {
                community_id: self.community_id,
                name: unescape_html(&entry.title).into_owned(),
                body: extracted.body,
                url: extracted.url,
            };

            if self.dry_run {
                tracing::info!(
                    link = %entry.link,
                    title = %post.name,
                    url = post.url.as_deref().unwrap_or_default(),
                    "Dry run: would post"
                );
                previewed.insert(&entry.link);
                report.published += 1;
                continue;
            }

            let post_id = self
                .forum
                .create_post(&post)
                .await
                .with_context(|| format!("Failed to publish {}", entry.link))?;
            records.insert(entry.link.clone(), Utc::now());
            report.published += 1;
            tracing::info!(link = %entry.link, post_id = post_id, "Posted");

            tokio::time::sleep(self.post_delay).await;
        }
        Ok(())
    }
}
