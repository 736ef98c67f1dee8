//! Shared HTTP plumbing for the remote stages.
//!
//! Every remote stage sends exactly one request and classifies the answer
//! into an accepted JSON body or a rejection carrying the upstream's own error
//! text. Transport failures are reported separately and never include the
//! request URL, which for Facebook carries the access token.

use reqwest::RequestBuilder;
use serde_json::Value;

use crate::config::PipelineConfig;
use crate::error::{BadgeError, Result};
use crate::stage::Stage;

/// Outcome of one upstream call that reached the service.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Reply {
    /// 2xx with a JSON body and no `error` field.
    Accepted(Value),
    /// Anything else, with the upstream's error payload rendered as text.
    Rejected(String),
}

/// Build the shared HTTP client for a pipeline.
pub fn build_client(config: &PipelineConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| BadgeError::InvalidConfig(format!("failed to create HTTP client: {e}")))
}

/// Send `request` and classify the response.
pub(crate) async fn dispatch(request: RequestBuilder, stage: Stage) -> Result<Reply> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(stage, e))?;
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(stage, e))?;
    Ok(classify(status, &body))
}

fn transport_error(stage: Stage, err: reqwest::Error) -> BadgeError {
    BadgeError::Transport {
        stage,
        message: err.without_url().to_string(),
    }
}

/// Classify a raw status and body.
///
/// Rejections carry the upstream payload verbatim: the trimmed body for
/// non-2xx statuses, the compact `error` value for 2xx bodies that report one.
pub(crate) fn classify(status: u16, body: &str) -> Reply {
    if !(200..300).contains(&status) {
        let payload = body.trim();
        return if payload.is_empty() {
            Reply::Rejected(format!("status {status}"))
        } else {
            Reply::Rejected(format!("status {status}: {payload}"))
        };
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value) => match value.get("error").filter(|e| !e.is_null()) {
            Some(error) => Reply::Rejected(render(error)),
            None => Reply::Accepted(value),
        },
        Err(e) => Reply::Rejected(format!("malformed response body: {e}")),
    }
}

/// Plain strings as-is, anything else as compact JSON.
fn render(payload: &Value) -> String {
    match payload {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
