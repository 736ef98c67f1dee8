//! Facebook Graph API adapter.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{fetch_with, IdentityProvider};
use crate::error::Result;
use crate::profile::{NormalizedProfile, ProviderKind};

const FIELDS: &str = "id,name,picture";

/// Reads `me?fields=id,name,picture`, passing the token as `access_token`.
pub struct FacebookAdapter {
    client: reqwest::Client,
    endpoint: String,
}

impl FacebookAdapter {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    fn request(&self, access_token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(&self.endpoint)
            .query(&[("fields", FIELDS), ("access_token", access_token)])
    }
}

#[async_trait]
impl IdentityProvider for FacebookAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Facebook
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<NormalizedProfile> {
        fetch_with(ProviderKind::Facebook, self.request(access_token), parse_profile).await
    }
}

#[derive(Deserialize)]
struct Me {
    id: String,
    name: String,
    picture: Picture,
}

#[derive(Deserialize)]
struct Picture {
    data: PictureData,
}

#[derive(Deserialize)]
struct PictureData {
    url: String,
}

/// Map a Graph API `me` body into a profile.
pub fn parse_profile(body: Value) -> std::result::Result<NormalizedProfile, String> {
    let me: Me = serde_json::from_value(body)
        .map_err(|e| format!("unexpected Graph API response: {e}"))?;
    Ok(NormalizedProfile::new(
        ProviderKind::Facebook,
        me.id,
        me.name,
        me.picture.data.url,
    ))
}
