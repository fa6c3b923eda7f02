//! Request and response bodies for the Lemmy v3 HTTP API.
//!
//! Only the fields this crate reads are modelled; serde ignores the rest.
use serde::{Deserialize, Serialize};

pub type CommunityId = i64;
pub type PostId = i64;

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username_or_email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct LoginResponse {
    /// Absent when the account still needs email verification or approval.
    pub jwt: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct GetCommunityResponse {
    pub community_view: CommunityView,
}

#[derive(Deserialize)]
pub(crate) struct CommunityView {
    pub community: Community,
}

#[derive(Deserialize)]
pub(crate) struct Community {
    pub id: CommunityId,
}

/// A post to create in a community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    pub community_id: CommunityId,
    /// Post title.
    pub name: String,
    /// Markdown body.
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct PostResponse {
    pub post_view: PostView,
}

#[derive(Deserialize)]
pub(crate) struct PostView {
    pub post: Post,
}

#[derive(Deserialize)]
pub(crate) struct Post {
    pub id: PostId,
}
