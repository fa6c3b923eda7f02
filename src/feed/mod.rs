//! Feed polling: HTTP retrieval and RSS/Atom parsing.
//!
//! - [`parser`] - Low-level feed parsing using the `feed-rs` crate
//! - [`fetcher`] - Single-shot HTTP fetch with size and timeout limits

mod fetcher;
mod parser;

pub use fetcher::{fetch_feed, FetchError};
pub use parser::{parse_feed, FeedEntry, ParseResult};
