//! Local run state: the last-fetch marker and the record of published URLs.
//!
//! The two files are independent; nothing couples their writes. Single-process
//! use is assumed and no locking is done.

mod last_fetch;
mod publish_record;
mod types;

pub use last_fetch::LastFetchMarker;
pub use publish_record::PublishRecord;
pub use types::{PublishedItem, StateError};

/// File name of the last-fetch marker inside the state directory.
pub const LAST_FETCH_FILE: &str = "last_date_published.txt";
/// File name of the publish record inside the state directory.
pub const PUBLISH_RECORD_FILE: &str = "published_posts.json";
