//! GitHub REST adapter.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{fetch_with, IdentityProvider};
use crate::error::Result;
use crate::profile::{NormalizedProfile, ProfileAttributes, ProviderKind};

/// Reads the authenticated `user` with a bearer token.
pub struct GitHubAdapter {
    client: reqwest::Client,
    endpoint: String,
}

impl GitHubAdapter {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    fn request(&self, access_token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(&self.endpoint)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
    }
}

#[async_trait]
impl IdentityProvider for GitHubAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<NormalizedProfile> {
        fetch_with(ProviderKind::GitHub, self.request(access_token), parse_profile).await
    }
}

#[derive(Deserialize)]
struct User {
    login: String,
    id: u64,
    avatar_url: String,
    bio: Option<String>,
    blog: Option<String>,
    company: Option<String>,
    location: Option<String>,
    email: Option<String>,
    twitter_username: Option<String>,
    followers: Option<u64>,
    following: Option<u64>,
    public_repos: Option<u64>,
    public_gists: Option<u64>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

/// Map a `GET /user` body into a profile. The login is the display name.
pub fn parse_profile(body: Value) -> std::result::Result<NormalizedProfile, String> {
    let user: User =
        serde_json::from_value(body).map_err(|e| format!("unexpected user response: {e}"))?;

    let attributes = ProfileAttributes {
        email: user.email,
        bio: user.bio,
        blog: user.blog,
        company: user.company,
        location: user.location,
        twitter_username: user.twitter_username,
        followers: user.followers,
        following: user.following,
        public_repos: user.public_repos,
        public_gists: user.public_gists,
        created_at: user.created_at,
        updated_at: user.updated_at,
        ..ProfileAttributes::default()
    };

    Ok(NormalizedProfile::new(
        ProviderKind::GitHub,
        user.id.to_string(),
        user.login,
        user.avatar_url,
    )
    .with_attributes(attributes))
}
