//! Invocation credentials and the secret validator.
//!
//! Secrets are provisioned by the oracle runtime (or the environment when
//! simulating locally). Only presence is ever logged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{BadgeError, Result};
use crate::obs;

/// Names of the secrets a badge program may require.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CredentialName {
    /// The caller's OAuth access token for the identity provider.
    AccessToken,

    /// API key for the image templating service.
    ImageApiKey,

    /// API key for the metadata storage relay.
    StorageApiKey,
}

impl CredentialName {
    /// All known credential names.
    pub const ALL: [CredentialName; 3] = [
        CredentialName::AccessToken,
        CredentialName::ImageApiKey,
        CredentialName::StorageApiKey,
    ];

    /// Environment variable the credential is read from.
    pub fn env_var(&self) -> &'static str {
        match self {
            CredentialName::AccessToken => "ACCESS_TOKEN",
            CredentialName::ImageApiKey => "IMAGE_API_KEY",
            CredentialName::StorageApiKey => "NFT_STORAGE_API_KEY",
        }
    }
}

impl std::fmt::Display for CredentialName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.env_var())
    }
}

/// Secret values for one invocation.
#[derive(Clone, Default)]
pub struct Credentials {
    secrets: BTreeMap<CredentialName, String>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every known credential from its environment variable.
    ///
    /// Unset variables are simply absent; validation happens later against
    /// the program's requirements.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Credentials resolved through `lookup`, keyed by environment variable name.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut credentials = Self::new();
        for name in CredentialName::ALL {
            if let Some(value) = lookup(name.env_var()) {
                credentials.insert(name, value);
            }
        }
        credentials
    }

    /// Builder-style insert.
    pub fn with(mut self, name: CredentialName, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: CredentialName, value: impl Into<String>) {
        self.secrets.insert(name, value.into());
    }

    /// The secret value, if present and non-empty.
    pub fn get(&self, name: CredentialName) -> Option<&str> {
        self.secrets
            .get(&name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Like [`Credentials::get`] but fails with `MissingCredential`.
    pub fn require(&self, name: CredentialName) -> Result<&str> {
        self.get(name).ok_or_else(|| BadgeError::MissingCredential {
            name: name.env_var().to_string(),
        })
    }

    pub fn contains(&self, name: CredentialName) -> bool {
        self.get(name).is_some()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for name in self.secrets.keys() {
            map.entry(&name.env_var(), &"<redacted>");
        }
        map.finish()
    }
}

/// Checks required credentials before any network call is made.
pub struct SecretValidator;

impl SecretValidator {
    /// Fail with `MissingCredential` naming the first required credential
    /// that is absent or blank.
    ///
    /// Emits one presence-only log line per required credential.
    pub fn validate(credentials: &Credentials, required: &[CredentialName]) -> Result<()> {
        for name in required {
            obs::emit_credential_presence(*name, credentials.contains(*name));
        }

        match required.iter().find(|name| !credentials.contains(**name)) {
            Some(name) => Err(BadgeError::MissingCredential {
                name: name.env_var().to_string(),
            }),
            None => Ok(()),
        }
    }
}
