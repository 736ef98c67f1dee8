//! Normalized identity profiles.
//!
//! Each identity adapter maps its provider's user-info payload into a
//! [`NormalizedProfile`]. Downstream stages only ever see this shape.

use serde::{Deserialize, Serialize};

/// Supported social-identity providers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Facebook,
    Google,
    GitHub,
}

impl ProviderKind {
    /// Lowercase identifier used in logs and program names.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Facebook => "facebook",
            ProviderKind::Google => "google",
            ProviderKind::GitHub => "github",
        }
    }

    /// Human-facing label printed on badges and metadata names.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::Facebook => "Facebook",
            ProviderKind::Google => "Google",
            ProviderKind::GitHub => "Github",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Optional, provider-specific profile attributes.
///
/// A field is `None` whenever the provider omitted it or returned `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileAttributes {
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub locale: Option<String>,
    pub bio: Option<String>,
    /// Personal website (GitHub `blog`).
    pub blog: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub twitter_username: Option<String>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub public_repos: Option<u64>,
    pub public_gists: Option<u64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Provider-independent view of the caller's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedProfile {
    /// Provider that vouched for this identity.
    pub provider: ProviderKind,

    /// Stable provider-side identifier.
    pub id: String,

    /// Name shown on the badge (GitHub login, Facebook/Google full name).
    pub display_name: String,

    /// Avatar or profile photo URL.
    pub avatar_url: String,

    /// Everything else the provider returned that downstream stages use.
    pub attributes: ProfileAttributes,
}

impl NormalizedProfile {
    pub fn new(
        provider: ProviderKind,
        id: impl Into<String>,
        display_name: impl Into<String>,
        avatar_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            id: id.into(),
            display_name: display_name.into(),
            avatar_url: avatar_url.into(),
            attributes: ProfileAttributes::default(),
        }
    }

    /// Attach provider-specific attributes.
    pub fn with_attributes(mut self, attributes: ProfileAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}
