//! Pipeline stage definitions.
//!
//! One invocation walks these stages in declaration order. The eligibility
//! stage is skipped for programs without a predicate, and flag-mode programs
//! jump straight to encoding once the verdict is known.

use serde::{Deserialize, Serialize};

/// Stages of a single badge-issuance invocation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Required credentials are checked for presence.
    ValidatingSecrets,

    /// The identity provider's user-info endpoint is queried.
    FetchingIdentity,

    /// The program's predicate is evaluated against the profile.
    EvaluatingEligibility,

    /// The templating service renders the badge image.
    ComposingImage,

    /// Badge metadata is built from profile and image.
    AssemblingMetadata,

    /// Metadata is submitted to the storage relay.
    StoringMetadata,

    /// The terminal result is encoded for the calling contract.
    Encoding,
}

impl Stage {
    /// Get the stage name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::ValidatingSecrets => "validating_secrets",
            Stage::FetchingIdentity => "fetching_identity",
            Stage::EvaluatingEligibility => "evaluating_eligibility",
            Stage::ComposingImage => "composing_image",
            Stage::AssemblingMetadata => "assembling_metadata",
            Stage::StoringMetadata => "storing_metadata",
            Stage::Encoding => "encoding",
        }
    }

    /// Whether the stage issues an outbound call and therefore runs under the
    /// per-stage timeout.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Stage::FetchingIdentity | Stage::ComposingImage | Stage::StoringMetadata
        )
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
