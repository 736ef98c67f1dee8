//! Badge programs: which provider, which mode, which gate, which template.
//!
//! A program is the unit an on-chain contract asks the oracle to run. The
//! builtin catalog reproduces the deployed Zixin and Shiji badges.

use serde::{Deserialize, Serialize};

use crate::credentials::CredentialName;
use crate::eligibility::EligibilityPredicate;
use crate::error::{BadgeError, Result};
use crate::image::ImageRequest;
use crate::profile::{NormalizedProfile, ProviderKind};

/// Background used by the Shiji "Mr. Popular" badge.
pub const OCTOCAT_BACKGROUND_URL: &str =
    "https://www.pngitem.com/pimgs/m/79-794894_bouncer-github-octocat-hd-png-download.png";

/// Informational result returned when a URI-mode program's gate fails.
pub const NOT_ENOUGH_FOLLOWERS: &str = "Not enough followers to earn this Shiji";

/// What the invocation returns to the calling contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InvocationMode {
    /// Issue the badge and return the metadata URI.
    Uri,
    /// Only check eligibility and return a numeric flag.
    Flag,
}

impl InvocationMode {
    pub fn name(&self) -> &'static str {
        match self {
            InvocationMode::Uri => "uri",
            InvocationMode::Flag => "flag",
        }
    }

    /// Credentials an invocation in this mode cannot run without.
    pub fn required_credentials(&self) -> &'static [CredentialName] {
        match self {
            InvocationMode::Uri => &CredentialName::ALL,
            InvocationMode::Flag => &[CredentialName::AccessToken],
        }
    }
}

/// Where the badge background comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundSource {
    /// The caller's avatar or profile photo.
    ProfileAvatar,
    /// A fixed image shared by every badge of the program.
    Fixed(String),
}

impl BackgroundSource {
    pub fn resolve(&self, profile: &NormalizedProfile) -> String {
        match self {
            BackgroundSource::ProfileAvatar => profile.avatar_url.clone(),
            BackgroundSource::Fixed(url) => url.clone(),
        }
    }
}

/// Text and imagery of a badge.
///
/// `description` may contain `{display_name}`, `{email}` and `{bio}`
/// placeholders. Absence is handled per metadata field: a placeholder with no
/// profile value renders as empty text (the description is always a string),
/// a missing GitHub `blog` omits `externalLink`, and a missing attribute value
/// is written as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeTemplate {
    /// Prepended verbatim to the display name to form the metadata name.
    pub name_prefix: String,
    pub description: String,
    /// Label caption rendered on the image.
    pub label: String,
    pub background: BackgroundSource,
}

/// A complete invocation variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeProgram {
    pub name: String,
    pub provider: ProviderKind,
    pub mode: InvocationMode,
    pub predicate: Option<EligibilityPredicate>,
    pub template: BadgeTemplate,
    /// Result text for a failed gate in URI mode.
    pub ineligible_message: String,
}

impl BadgeProgram {
    /// Reject programs that cannot run: flag mode needs a predicate.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BadgeError::InvalidConfig(
                "badge program name must not be empty".to_string(),
            ));
        }
        if self.mode == InvocationMode::Flag && self.predicate.is_none() {
            return Err(BadgeError::InvalidConfig(format!(
                "program {} runs in flag mode but has no eligibility predicate",
                self.name
            )));
        }
        Ok(())
    }

    pub fn required_credentials(&self) -> &'static [CredentialName] {
        self.mode.required_credentials()
    }

    /// Overlay inputs for `profile`.
    pub fn image_request(&self, profile: &NormalizedProfile) -> ImageRequest {
        ImageRequest {
            background_url: self.template.background.resolve(profile),
            caption: primary_caption(profile),
            label: self.template.label.clone(),
        }
    }
}

/// Main caption text: the display name, except Google which shows
/// `given name | email`.
pub fn primary_caption(profile: &NormalizedProfile) -> String {
    match profile.provider {
        ProviderKind::Google => {
            let given = profile
                .attributes
                .given_name
                .as_deref()
                .unwrap_or(&profile.display_name);
            match profile.attributes.email.as_deref() {
                Some(email) => format!("{given} | {email}"),
                None => given.to_string(),
            }
        }
        ProviderKind::Facebook | ProviderKind::GitHub => profile.display_name.clone(),
    }
}

/// Programs shipped with Zixin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BuiltinProgram {
    FacebookZixin,
    GoogleZixin,
    GitHubZixin,
    GitHubMrPopular,
    GitHubMrPopularCheck,
}

impl BuiltinProgram {
    pub const ALL: [BuiltinProgram; 5] = [
        BuiltinProgram::FacebookZixin,
        BuiltinProgram::GoogleZixin,
        BuiltinProgram::GitHubZixin,
        BuiltinProgram::GitHubMrPopular,
        BuiltinProgram::GitHubMrPopularCheck,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinProgram::FacebookZixin => "facebook-zixin",
            BuiltinProgram::GoogleZixin => "google-zixin",
            BuiltinProgram::GitHubZixin => "github-zixin",
            BuiltinProgram::GitHubMrPopular => "github-mr-popular",
            BuiltinProgram::GitHubMrPopularCheck => "github-mr-popular-check",
        }
    }

    /// Look up a builtin by its name.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|program| program.name() == name.trim())
            .ok_or_else(|| BadgeError::UnknownProgram(name.to_string()))
    }

    pub fn program(&self) -> BadgeProgram {
        match self {
            BuiltinProgram::FacebookZixin => zixin(
                self.name(),
                ProviderKind::Facebook,
                "A soulbound NFT that represents the ownership of Facebook account of {display_name}",
            ),
            BuiltinProgram::GoogleZixin => zixin(
                self.name(),
                ProviderKind::Google,
                "A soulbound NFT that represents the ownership of Google account {email}",
            ),
            BuiltinProgram::GitHubZixin => zixin(self.name(), ProviderKind::GitHub, "{bio}"),
            BuiltinProgram::GitHubMrPopular => mr_popular(self.name(), InvocationMode::Uri),
            BuiltinProgram::GitHubMrPopularCheck => mr_popular(self.name(), InvocationMode::Flag),
        }
    }
}

fn zixin(name: &str, provider: ProviderKind, description: &str) -> BadgeProgram {
    BadgeProgram {
        name: name.to_string(),
        provider,
        mode: InvocationMode::Uri,
        predicate: None,
        template: BadgeTemplate {
            name_prefix: format!("Zixin | {} |", provider.label()),
            description: description.to_string(),
            label: format!("{} | Zixin", provider.label()),
            background: BackgroundSource::ProfileAvatar,
        },
        ineligible_message: String::new(),
    }
}

fn mr_popular(name: &str, mode: InvocationMode) -> BadgeProgram {
    let predicate = EligibilityPredicate::min_followers(10);
    BadgeProgram {
        name: name.to_string(),
        provider: ProviderKind::GitHub,
        mode,
        template: BadgeTemplate {
            name_prefix: "Shiji | Github |".to_string(),
            description: format!(
                "A soulbound NFT that represents that this user has at least {} Github Followers",
                predicate.minimum
            ),
            label: "Github | Mr. Popular | Shiji".to_string(),
            background: BackgroundSource::Fixed(OCTOCAT_BACKGROUND_URL.to_string()),
        },
        predicate: Some(predicate),
        ineligible_message: NOT_ENOUGH_FOLLOWERS.to_string(),
    }
}
