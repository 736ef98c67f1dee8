//! Zixin core: soulbound badge issuance for oracle-executed computations.
//!
//! An invocation fetches the caller's identity from one OAuth provider,
//! optionally gates on a profile predicate, renders a badge image, assembles
//! NFT metadata, pins it through a storage relay and returns either the
//! metadata URI or an eligibility flag.

pub mod config;
pub mod credentials;
pub mod eligibility;
pub mod encoding;
pub mod error;
pub mod fakes;
pub(crate) mod http;
pub mod image;
pub mod metadata;
pub mod obs;
pub mod pipeline;
pub mod profile;
pub mod program;
pub mod provider;
pub mod stage;
pub mod storage;
pub mod telemetry;

pub use config::{PipelineConfig, ServiceEndpoints};
pub use credentials::{CredentialName, Credentials, SecretValidator};
pub use eligibility::{EligibilityEvaluator, EligibilityPredicate, EligibilityVerdict, NumericField};
pub use encoding::{EligibilityFlag, PipelineResult, ResultEncoder};
pub use error::{BadgeError, Result};
pub use image::{ApiTemplateComposer, ComposedImage, ImageComposer, ImageRequest};
pub use metadata::{Attribute, AttributeValue, BadgeMetadata, MetadataAssembler};
pub use pipeline::{BadgePipeline, InvocationReport};
pub use profile::{NormalizedProfile, ProfileAttributes, ProviderKind};
pub use program::{BadgeProgram, BadgeTemplate, BackgroundSource, BuiltinProgram, InvocationMode};
pub use provider::{FacebookAdapter, GitHubAdapter, GoogleAdapter, IdentityProvider};
pub use stage::Stage;
pub use storage::{HttpStorageRelay, StorageReceipt, StorageRelay};
