//! Lemmy API client: login, community lookup and post creation.

mod client;
mod models;

pub use client::{ForumError, LemmyClient};
pub use models::{CommunityId, NewPost, PostId};
