//! Error taxonomy for badge issuance.
//!
//! Every variant is fatal to the invocation that raised it. Ineligible
//! profiles are not errors; they are reported through
//! [`PipelineResult`](crate::encoding::PipelineResult).

use crate::profile::ProviderKind;
use crate::stage::Stage;

/// Errors produced by the badge pipeline.
#[derive(Debug, thiserror::Error)]
pub enum BadgeError {
    #[error("missing credential: {name}")]
    MissingCredential { name: String },

    #[error("{provider} identity fetch failed: {message}")]
    IdentityFetchFailed {
        provider: ProviderKind,
        message: String,
    },

    #[error("image compose failed: {0}")]
    ImageComposeFailed(String),

    #[error("storage submit failed: {0}")]
    StorageSubmitFailed(String),

    #[error("stage {stage} timed out after {limit_ms}ms")]
    Timeout { stage: Stage, limit_ms: u64 },

    #[error("transport error during {stage}: {message}")]
    Transport { stage: Stage, message: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown badge program: {0}")]
    UnknownProgram(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BadgeError {
    /// The pipeline stage this error belongs to, when it has one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            BadgeError::MissingCredential { .. } => Some(Stage::ValidatingSecrets),
            BadgeError::IdentityFetchFailed { .. } => Some(Stage::FetchingIdentity),
            BadgeError::ImageComposeFailed(_) => Some(Stage::ComposingImage),
            BadgeError::StorageSubmitFailed(_) => Some(Stage::StoringMetadata),
            BadgeError::Timeout { stage, .. } | BadgeError::Transport { stage, .. } => {
                Some(*stage)
            }
            BadgeError::Serialization(_) => Some(Stage::AssemblingMetadata),
            BadgeError::InvalidConfig(_) | BadgeError::UnknownProgram(_) => None,
        }
    }

    /// Short machine-readable kind, used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BadgeError::MissingCredential { .. } => "missing_credential",
            BadgeError::IdentityFetchFailed { .. } => "identity_fetch_failed",
            BadgeError::ImageComposeFailed(_) => "image_compose_failed",
            BadgeError::StorageSubmitFailed(_) => "storage_submit_failed",
            BadgeError::Timeout { .. } => "timeout",
            BadgeError::Transport { .. } => "transport_error",
            BadgeError::InvalidConfig(_) => "invalid_config",
            BadgeError::UnknownProgram(_) => "unknown_program",
            BadgeError::Serialization(_) => "serialization",
        }
    }
}

/// Result type for badge pipeline operations.
pub type Result<T> = std::result::Result<T, BadgeError>;
