//! Service endpoints and pipeline tuning.
//!
//! Defaults carry the production endpoints. `PipelineConfig::from_env`
//! layers `ZIXIN_*` overrides on top, which is how local simulations point
//! the pipeline at staging services.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BadgeError, Result};

/// Default per-stage timeout in seconds.
pub const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 9;

/// Template rendered for every badge image.
pub const DEFAULT_IMAGE_TEMPLATE_ID: &str = "1c077b23aaf7c198";

/// URLs of every external service the pipeline talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoints {
    /// Facebook Graph API `me` endpoint.
    pub facebook_me_url: String,
    /// Google OAuth2 user-info endpoint.
    pub google_userinfo_url: String,
    /// GitHub authenticated-user endpoint.
    pub github_user_url: String,
    /// Image templating `create-image` endpoint.
    pub image_service_url: String,
    /// Template identifier passed to the image service.
    pub image_template_id: String,
    /// Storage relay endpoint accepting serialized metadata.
    pub storage_relay_url: String,
    /// Gateway domain suffix; the final URI is `https://<cid>.<suffix>/metadata.json`.
    pub gateway_suffix: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        ServiceEndpoints {
            facebook_me_url: "https://graph.facebook.com/me".to_string(),
            google_userinfo_url: "https://www.googleapis.com/userinfo/v2/me".to_string(),
            github_user_url: "https://api.github.com/user".to_string(),
            image_service_url: "https://rest.apitemplate.io/v2/create-image".to_string(),
            image_template_id: DEFAULT_IMAGE_TEMPLATE_ID.to_string(),
            storage_relay_url: "https://zixins-be1.adaptable.app/auth/store".to_string(),
            gateway_suffix: "ipfs.nftstorage.link".to_string(),
        }
    }
}

/// Pipeline-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub endpoints: ServiceEndpoints,

    /// Upper bound for each outbound stage, in seconds. Zero disables it.
    pub stage_timeout_secs: u64,

    /// User agent sent on every request (GitHub rejects requests without one).
    pub user_agent: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            endpoints: ServiceEndpoints::default(),
            stage_timeout_secs: DEFAULT_STAGE_TIMEOUT_SECS,
            user_agent: format!("zixin/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl PipelineConfig {
    /// Defaults with environment overrides applied.
    ///
    /// Recognised variables: `ZIXIN_FACEBOOK_ME_URL`, `ZIXIN_GOOGLE_USERINFO_URL`,
    /// `ZIXIN_GITHUB_USER_URL`, `ZIXIN_IMAGE_SERVICE_URL`,
    /// `ZIXIN_IMAGE_TEMPLATE_ID`, `ZIXIN_STORAGE_RELAY_URL`,
    /// `ZIXIN_GATEWAY_SUFFIX`, `ZIXIN_STAGE_TIMEOUT_SECS`, `ZIXIN_USER_AGENT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides resolved through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let endpoints = &mut config.endpoints;

        let overrides: [(&str, &mut String); 7] = [
            ("ZIXIN_FACEBOOK_ME_URL", &mut endpoints.facebook_me_url),
            ("ZIXIN_GOOGLE_USERINFO_URL", &mut endpoints.google_userinfo_url),
            ("ZIXIN_GITHUB_USER_URL", &mut endpoints.github_user_url),
            ("ZIXIN_IMAGE_SERVICE_URL", &mut endpoints.image_service_url),
            ("ZIXIN_IMAGE_TEMPLATE_ID", &mut endpoints.image_template_id),
            ("ZIXIN_STORAGE_RELAY_URL", &mut endpoints.storage_relay_url),
            ("ZIXIN_GATEWAY_SUFFIX", &mut endpoints.gateway_suffix),
        ];
        for (key, slot) in overrides {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = value.trim().to_string();
            }
        }

        if let Some(raw) = lookup("ZIXIN_STAGE_TIMEOUT_SECS") {
            config.stage_timeout_secs = raw.trim().parse().map_err(|_| {
                BadgeError::InvalidConfig(format!(
                    "ZIXIN_STAGE_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}"
                ))
            })?;
        }

        if let Some(agent) = lookup("ZIXIN_USER_AGENT").filter(|v| !v.trim().is_empty()) {
            config.user_agent = agent;
        }

        Ok(config)
    }

    /// Per-stage timeout, `None` when disabled.
    pub fn stage_timeout(&self) -> Option<Duration> {
        (self.stage_timeout_secs > 0).then(|| Duration::from_secs(self.stage_timeout_secs))
    }

    /// Builder-style timeout override.
    pub fn with_stage_timeout_secs(mut self, secs: u64) -> Self {
        self.stage_timeout_secs = secs;
        self
    }
}
