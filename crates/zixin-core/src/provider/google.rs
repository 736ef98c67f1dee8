//! Google OAuth2 user-info adapter.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{fetch_with, IdentityProvider};
use crate::error::Result;
use crate::profile::{NormalizedProfile, ProfileAttributes, ProviderKind};

/// Reads `userinfo/v2/me` with a bearer token.
pub struct GoogleAdapter {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleAdapter {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    fn request(&self, access_token: &str) -> reqwest::RequestBuilder {
        self.client.get(&self.endpoint).bearer_auth(access_token)
    }
}

#[async_trait]
impl IdentityProvider for GoogleAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<NormalizedProfile> {
        fetch_with(ProviderKind::Google, self.request(access_token), parse_profile).await
    }
}

#[derive(Deserialize)]
struct UserInfo {
    id: String,
    picture: String,
    email: Option<String>,
    name: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    locale: Option<String>,
}

/// Map a `userinfo/v2/me` body into a profile.
///
/// The display name is the full `name`, falling back to given and family
/// names, then to the email address.
pub fn parse_profile(body: Value) -> std::result::Result<NormalizedProfile, String> {
    let info: UserInfo = serde_json::from_value(body)
        .map_err(|e| format!("unexpected userinfo response: {e}"))?;

    let joined = [info.given_name.as_deref(), info.family_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    let display_name = info
        .name
        .clone()
        .or_else(|| (!joined.is_empty()).then_some(joined))
        .or_else(|| info.email.clone())
        .ok_or_else(|| "userinfo response has no name or email".to_string())?;

    let attributes = ProfileAttributes {
        email: info.email,
        given_name: info.given_name,
        family_name: info.family_name,
        locale: info.locale,
        ..ProfileAttributes::default()
    };

    Ok(
        NormalizedProfile::new(ProviderKind::Google, info.id, display_name, info.picture)
            .with_attributes(attributes),
    )
}
