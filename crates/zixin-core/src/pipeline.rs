//! Badge issuance orchestration.
//!
//! One [`BadgePipeline`] drives one invocation through the stages in strict
//! order:
//!
//! ```text
//! ValidatingSecrets -> FetchingIdentity -> [EvaluatingEligibility]
//!   -> ComposingImage -> AssemblingMetadata -> StoringMetadata -> Encoding
//! ```
//!
//! Any stage error aborts the run. A negative eligibility verdict ends it
//! early with an ineligible result, which is not an error. Every remote call
//! is bounded by the configured stage timeout and never retried.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::credentials::{CredentialName, Credentials, SecretValidator};
use crate::eligibility::{EligibilityEvaluator, EligibilityVerdict};
use crate::encoding::{EligibilityFlag, PipelineResult, ResultEncoder};
use crate::error::{BadgeError, Result};
use crate::http;
use crate::image::{ApiTemplateComposer, ImageComposer};
use crate::metadata::MetadataAssembler;
use crate::obs;
use crate::profile::ProviderKind;
use crate::program::{BadgeProgram, InvocationMode};
use crate::provider::{self, IdentityProvider};
use crate::stage::Stage;
use crate::storage::{HttpStorageRelay, StorageRelay};

/// Outcome of one successful invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationReport {
    /// Fresh v4 UUID identifying this invocation in logs.
    pub invocation_id: String,

    /// Name of the program that ran.
    pub program: String,

    /// The terminal result handed back to the caller.
    pub result: PipelineResult,

    /// Eligibility outcome, if the program is gated.
    pub verdict: Option<EligibilityVerdict>,

    /// Stages entered, in order.
    pub stages: Vec<Stage>,

    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl InvocationReport {
    /// Oracle return bytes for the result.
    pub fn encoded(&self) -> Vec<u8> {
        self.result.encode()
    }
}

/// Orchestrates one provider's badge issuance.
pub struct BadgePipeline {
    identity: Arc<dyn IdentityProvider>,
    composer: Arc<dyn ImageComposer>,
    relay: Arc<dyn StorageRelay>,
    config: PipelineConfig,
}

impl BadgePipeline {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        composer: Arc<dyn ImageComposer>,
        relay: Arc<dyn StorageRelay>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            identity,
            composer,
            relay,
            config,
        }
    }

    /// Wire the HTTP adapters for `kind` against the configured services.
    pub fn from_config(kind: ProviderKind, config: PipelineConfig) -> Result<Self> {
        let client = http::build_client(&config)?;
        let identity = provider::adapter_for(kind, &config, client.clone());
        let composer = Arc::new(ApiTemplateComposer::from_config(client.clone(), &config));
        let relay = Arc::new(HttpStorageRelay::from_config(client, &config));
        Ok(Self::new(identity, composer, relay, config))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run `program` once with `credentials`.
    pub async fn run(
        &self,
        program: &BadgeProgram,
        credentials: &Credentials,
    ) -> Result<InvocationReport> {
        let invocation_id = Uuid::new_v4().to_string();
        let span = obs::invocation_span(&invocation_id, &program.name);
        self.execute(invocation_id, program, credentials)
            .instrument(span)
            .await
    }

    async fn execute(
        &self,
        invocation_id: String,
        program: &BadgeProgram,
        credentials: &Credentials,
    ) -> Result<InvocationReport> {
        let start = Instant::now();
        obs::emit_invocation_started(&invocation_id, &program.name, program.mode.name());

        let mut stages = Vec::new();
        match self.drive(program, credentials, &mut stages).await {
            Ok((result, verdict)) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                obs::emit_invocation_finished(&invocation_id, result.kind(), duration_ms);
                Ok(InvocationReport {
                    invocation_id,
                    program: program.name.clone(),
                    result,
                    verdict,
                    stages,
                    duration_ms,
                })
            }
            Err(err) => {
                obs::emit_invocation_failed(&invocation_id, &err);
                Err(err)
            }
        }
    }

    async fn drive(
        &self,
        program: &BadgeProgram,
        credentials: &Credentials,
        stages: &mut Vec<Stage>,
    ) -> Result<(PipelineResult, Option<EligibilityVerdict>)> {
        program.validate()?;
        if program.provider != self.identity.kind() {
            return Err(BadgeError::InvalidConfig(format!(
                "program {} targets {} but the pipeline is wired to {}",
                program.name,
                program.provider,
                self.identity.kind()
            )));
        }

        enter(stages, Stage::ValidatingSecrets);
        SecretValidator::validate(credentials, program.required_credentials())?;
        let access_token = credentials.require(CredentialName::AccessToken)?;

        enter(stages, Stage::FetchingIdentity);
        let profile = self
            .bounded(
                Stage::FetchingIdentity,
                self.identity.fetch_profile(access_token),
            )
            .await?;

        let verdict = match &program.predicate {
            Some(predicate) => {
                enter(stages, Stage::EvaluatingEligibility);
                Some(EligibilityEvaluator::evaluate(&profile, predicate))
            }
            None => None,
        };
        let eligible = verdict.as_ref().map_or(true, |v| v.eligible);
        if let Some(failed) = verdict.as_ref().filter(|v| !v.eligible) {
            obs::emit_short_circuit(&failed.predicate, failed.observed);
        }

        if program.mode == InvocationMode::Flag {
            // a failed gate ends the run without an encoding stage
            if eligible {
                enter(stages, Stage::Encoding);
            }
            let flag = EligibilityFlag::from_eligible(eligible);
            return Ok((PipelineResult::Flag(flag), verdict));
        }
        if !eligible {
            let message = program.ineligible_message.clone();
            return Ok((PipelineResult::Ineligible(message), verdict));
        }

        let image_key = credentials.require(CredentialName::ImageApiKey)?;
        let storage_key = credentials.require(CredentialName::StorageApiKey)?;

        enter(stages, Stage::ComposingImage);
        let request = program.image_request(&profile);
        let image = self
            .bounded(
                Stage::ComposingImage,
                self.composer.compose(&request, image_key),
            )
            .await?;

        enter(stages, Stage::AssemblingMetadata);
        let metadata = MetadataAssembler::assemble(&profile, &image, &program.template);

        enter(stages, Stage::StoringMetadata);
        let receipt = self
            .bounded(
                Stage::StoringMetadata,
                self.relay.submit(&metadata, storage_key),
            )
            .await?;

        enter(stages, Stage::Encoding);
        let uri = ResultEncoder::metadata_uri(&receipt.cid, &self.config.endpoints.gateway_suffix);
        Ok((PipelineResult::Uri(uri), verdict))
    }

    /// Await `call`, failing with `Timeout` once the stage limit elapses.
    async fn bounded<T, F>(&self, stage: Stage, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        debug_assert!(stage.is_remote(), "{stage} makes no outbound call");
        match self.config.stage_timeout() {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| BadgeError::Timeout {
                    stage,
                    limit_ms: limit.as_millis() as u64,
                })?,
            None => call.await,
        }
    }
}

fn enter(stages: &mut Vec<Stage>, stage: Stage) {
    obs::emit_stage_entered(stage);
    stages.push(stage);
}
