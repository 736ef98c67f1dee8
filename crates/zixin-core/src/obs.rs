//! Structured observability hooks for badge invocations.
//!
//! This module provides:
//! - An invocation-scoped tracing span, see [`invocation_span`]
//! - Emission functions for lifecycle events: start, stage entry, credential
//!   presence, short-circuit, finish and failure
//!
//! Nothing emitted here carries secret material. Credentials are reported by
//! name and presence only.

use tracing::{debug, info, warn};

use crate::credentials::CredentialName;
use crate::error::BadgeError;
use crate::stage::Stage;

/// Span scoping one invocation.
///
/// Attach it to the invocation future with `tracing::Instrument` so the span
/// is re-entered on every poll rather than held across await points.
///
/// # Example
///
/// ```ignore
/// let span = invocation_span("3f1c...", "github-mr-popular");
/// pipeline.execute(program, credentials).instrument(span).await
/// ```
pub fn invocation_span(invocation_id: &str, program: &str) -> tracing::Span {
    tracing::info_span!(
        "zixin.invocation",
        invocation_id = %invocation_id,
        program = %program
    )
}

/// Emit event: invocation started.
pub fn emit_invocation_started(invocation_id: &str, program: &str, mode: &str) {
    info!(
        event = "invocation.started",
        invocation_id = %invocation_id,
        program = %program,
        mode = %mode,
    );
}

/// Emit event: the pipeline entered a stage.
pub fn emit_stage_entered(stage: Stage) {
    debug!(event = "stage.entered", stage = %stage);
}

/// Emit event: presence of one required credential. Never the value.
pub fn emit_credential_presence(name: CredentialName, present: bool) {
    debug!(event = "credential.checked", credential = %name, present = present);
}

/// Emit event: the eligibility predicate ended the invocation early.
pub fn emit_short_circuit(predicate: &str, observed: Option<u64>) {
    info!(
        event = "eligibility.short_circuit",
        predicate = %predicate,
        observed = ?observed,
    );
}

/// Emit event: invocation finished with a terminal result.
pub fn emit_invocation_finished(invocation_id: &str, result_kind: &str, duration_ms: u64) {
    info!(
        event = "invocation.finished",
        invocation_id = %invocation_id,
        result = %result_kind,
        duration_ms = duration_ms,
    );
}

/// Emit event: invocation aborted (warning level).
pub fn emit_invocation_failed(invocation_id: &str, error: &BadgeError) {
    warn!(
        event = "invocation.failed",
        invocation_id = %invocation_id,
        kind = error.kind(),
        stage = ?error.stage(),
        error = %error,
    );
}
