//! Relays new subreddit feed entries to a Lemmy community.
//!
//! A run logs in to the forum, polls the feed, drops discussion threads,
//! stale entries and anything already published, then posts the rest with a
//! markdown body built from each entry's links.

pub mod config;
pub mod feed;
pub mod forum;
pub mod relay;
pub mod storage;
pub mod util;
