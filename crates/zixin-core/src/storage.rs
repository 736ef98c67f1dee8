//! Metadata persistence through the storage relay.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::PipelineConfig;
use crate::error::{BadgeError, Result};
use crate::http::{self, Reply};
use crate::metadata::BadgeMetadata;
use crate::stage::Stage;

/// Content identifier returned by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageReceipt {
    pub cid: String,
}

/// Persists badge metadata and returns where it lives.
#[async_trait]
pub trait StorageRelay: Send + Sync {
    /// Submit `metadata`, authenticating with `api_key`.
    async fn submit(&self, metadata: &BadgeMetadata, api_key: &str) -> Result<StorageReceipt>;
}

/// HTTP relay that pins `{"metadataString": ...}` bodies to IPFS.
pub struct HttpStorageRelay {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpStorageRelay {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    pub fn from_config(client: reqwest::Client, config: &PipelineConfig) -> Self {
        Self::new(client, config.endpoints.storage_relay_url.clone())
    }

    fn build_request(&self, metadata_string: &str, api_key: &str) -> reqwest::RequestBuilder {
        self.client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&json!({ "metadataString": metadata_string }))
    }
}

#[async_trait]
impl StorageRelay for HttpStorageRelay {
    async fn submit(&self, metadata: &BadgeMetadata, api_key: &str) -> Result<StorageReceipt> {
        let metadata_string = metadata.to_canonical_json()?;
        let request = self.build_request(&metadata_string, api_key);
        match http::dispatch(request, Stage::StoringMetadata).await? {
            Reply::Accepted(body) => parse_receipt(&body).map_err(BadgeError::StorageSubmitFailed),
            Reply::Rejected(message) => Err(BadgeError::StorageSubmitFailed(message)),
        }
    }
}

/// Read `value.cid` from a relay response.
pub fn parse_receipt(body: &Value) -> std::result::Result<StorageReceipt, String> {
    body.pointer("/value/cid")
        .and_then(Value::as_str)
        .filter(|cid| !cid.is_empty())
        .map(|cid| StorageReceipt {
            cid: cid.to_string(),
        })
        .ok_or_else(|| format!("relay response missing value.cid: {body}"))
}
