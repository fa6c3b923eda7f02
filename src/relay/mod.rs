//! The relay pipeline: filter polled entries, build post bodies, gate on
//! domain, publish.
//!
//! - [`filter`] - Sticky, staleness and dedup decisions
//! - [`extract`] - Markdown body and shared-URL extraction from summaries
//! - [`domain`] - Registrable-domain lookup and the ignore list
//! - [`runner`] - One end-to-end run against the feed and the forum

pub mod domain;
pub mod extract;
pub mod filter;
mod runner;

pub use domain::{registrable_domain, IgnoreList};
pub use extract::{format_and_extract, Extracted};
pub use filter::{evaluate, select_eligible, FilterRules, Selection, Verdict};
pub use runner::{build_http_client, run_once, RunOptions, RunReport};
