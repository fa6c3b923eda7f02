use anyhow::Result;
use chrono::{DateTime, Utc};
use feed_rs::parser;

/// A single entry pulled from the polled feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Entry URL; doubles as the dedup key.
    pub link: String,
    pub title: String,
    pub published: DateTime<Utc>,
    /// Raw HTML summary (empty when the feed carries none).
    pub summary: String,
}

/// Outcome of parsing a feed document.
#[derive(Debug, Default)]
pub struct ParseResult {
    pub entries: Vec<FeedEntry>,
    /// Entries dropped because they had no link or no timestamp.
    pub skipped: usize,
}

/// Parse an RSS or Atom document into feed entries, in document order.
///
/// Entries without a link or without any timestamp cannot be deduplicated
/// or aged, so they are counted in [`ParseResult::skipped`] instead.
pub fn parse_feed(bytes: &[u8]) -> Result<ParseResult> {
    let feed = parser::parse(bytes)?;

    let mut result = ParseResult::default();
    for entry in feed.entries {
        let Some(link) = entry.links.first().map(|l| l.href.trim().to_string()) else {
            result.skipped += 1;
            continue;
        };
        if link.is_empty() {
            result.skipped += 1;
            continue;
        }
        let Some(published) = entry.published.or(entry.updated) else {
            tracing::debug!(link = %link, "Entry has no timestamp, dropping");
            result.skipped += 1;
            continue;
        };

        let summary = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .unwrap_or_default();
        let title = entry
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| "Untitled".to_string());

        result.entries.push(FeedEntry {
            link,
            title,
            published,
            summary,
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const REDDIT_ATOM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>newest submissions : bapcsalescanada</title>
  <id>https://www.reddit.com/r/bapcsalescanada/new/.rss</id>
  <updated>2024-03-01T12:00:00+00:00</updated>
  <entry>
    <id>t3_abc</id>
    <title>[GPU] Some card $499</title>
    <link href="https://www.reddit.com/r/bapcsalescanada/comments/abc/gpu/" />
    <published>2024-03-01T11:30:00+00:00</published>
    <updated>2024-03-01T11:30:00+00:00</updated>
    <content type="html">&lt;a href=&quot;https://shop.example.com/x&quot;&gt;[link]&lt;/a&gt;</content>
  </entry>
  <entry>
    <id>t3_def</id>
    <title>Second</title>
    <link href="https://www.reddit.com/r/bapcsalescanada/comments/def/second/" />
    <updated>2024-03-01T10:00:00+00:00</updated>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_reddit_atom() {
        let result = parse_feed(REDDIT_ATOM.as_bytes()).unwrap();
        assert_eq!(result.skipped, 0);
        assert_eq!(result.entries.len(), 2);

        let first = &result.entries[0];
        assert_eq!(
            first.link,
            "https://www.reddit.com/r/bapcsalescanada/comments/abc/gpu/"
        );
        assert_eq!(first.title, "[GPU] Some card $499");
        assert_eq!(
            first.published,
            Utc.with_ymd_and_hms(2024, 3, 1, 11, 30, 0).unwrap()
        );
        assert!(first.summary.contains("[link]"));
    }

    #[test]
    fn test_updated_used_when_published_missing() {
        let result = parse_feed(REDDIT_ATOM.as_bytes()).unwrap();
        assert_eq!(
            result.entries[1].published,
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
        );
        assert_eq!(result.entries[1].summary, "");
    }

    #[test]
    fn test_entry_without_timestamp_skipped() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <item><title>No date</title><link>https://example.com/a</link></item>
    <item><title>No link</title><pubDate>Fri, 01 Mar 2024 10:00:00 GMT</pubDate></item>
</channel></rss>"#;
        let result = parse_feed(rss.as_bytes()).unwrap();
        assert!(result.entries.is_empty());
        assert_eq!(result.skipped, 2);
    }

    #[test]
    fn test_invalid_xml_is_error() {
        assert!(parse_feed(b"<not valid xml").is_err());
    }
}
