//! Identity provider adapters.
//!
//! Each adapter issues exactly one authenticated GET to its provider's
//! user-info endpoint and maps the payload into a [`NormalizedProfile`].
//! The pipeline only ever talks to the [`IdentityProvider`] trait.

pub mod facebook;
pub mod github;
pub mod google;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::PipelineConfig;
use crate::error::{BadgeError, Result};
use crate::http::{self, Reply};
use crate::profile::{NormalizedProfile, ProviderKind};
use crate::stage::Stage;

pub use facebook::FacebookAdapter;
pub use github::GitHubAdapter;
pub use google::GoogleAdapter;

/// Fetches and normalizes the caller's profile.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Which provider this adapter speaks to.
    fn kind(&self) -> ProviderKind;

    /// Fetch the profile belonging to `access_token`.
    ///
    /// Fails with `IdentityFetchFailed` when the provider reports an error and
    /// with `Transport` when it cannot be reached.
    async fn fetch_profile(&self, access_token: &str) -> Result<NormalizedProfile>;
}

/// Build the HTTP adapter for `kind`.
pub fn adapter_for(
    kind: ProviderKind,
    config: &PipelineConfig,
    client: reqwest::Client,
) -> Arc<dyn IdentityProvider> {
    let endpoints = &config.endpoints;
    match kind {
        ProviderKind::Facebook => Arc::new(FacebookAdapter::new(
            client,
            endpoints.facebook_me_url.clone(),
        )),
        ProviderKind::Google => Arc::new(GoogleAdapter::new(
            client,
            endpoints.google_userinfo_url.clone(),
        )),
        ProviderKind::GitHub => {
            Arc::new(GitHubAdapter::new(client, endpoints.github_user_url.clone()))
        }
    }
}

/// Send a prepared user-info request and parse the accepted body.
pub(crate) async fn fetch_with<F>(
    kind: ProviderKind,
    request: reqwest::RequestBuilder,
    parse: F,
) -> Result<NormalizedProfile>
where
    F: FnOnce(Value) -> std::result::Result<NormalizedProfile, String>,
{
    match http::dispatch(request, Stage::FetchingIdentity).await? {
        Reply::Accepted(body) => parse(body).map_err(|message| identity_error(kind, message)),
        Reply::Rejected(message) => Err(identity_error(kind, message)),
    }
}

fn identity_error(provider: ProviderKind, message: String) -> BadgeError {
    BadgeError::IdentityFetchFailed { provider, message }
}
