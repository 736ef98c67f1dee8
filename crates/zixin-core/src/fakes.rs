//! In-memory fakes for the pipeline's remote seams (testing only)
//!
//! `FakeIdentityProvider`, `FakeImageComposer` and `FakeStorageRelay` satisfy
//! the trait contracts without any network. Each records every call it
//! receives so tests can assert which stages ran, and can be told to fail or
//! to stall for a while.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{BadgeError, Result};
use crate::image::{ComposedImage, ImageComposer, ImageRequest};
use crate::metadata::BadgeMetadata;
use crate::profile::{NormalizedProfile, ProviderKind};
use crate::provider::IdentityProvider;
use crate::storage::{StorageReceipt, StorageRelay};

async fn stall(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

// ---------------------------------------------------------------------------
// FakeIdentityProvider
// ---------------------------------------------------------------------------

/// Identity provider that hands back a canned profile.
#[derive(Debug)]
pub struct FakeIdentityProvider {
    kind: ProviderKind,
    outcome: std::result::Result<NormalizedProfile, String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeIdentityProvider {
    /// Answer every fetch with `profile`.
    pub fn returning(profile: NormalizedProfile) -> Self {
        Self {
            kind: profile.provider,
            outcome: Ok(profile),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail every fetch with `IdentityFetchFailed` carrying `message`.
    pub fn failing(kind: ProviderKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            outcome: Err(message.into()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Access tokens received, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<NormalizedProfile> {
        self.calls.lock().unwrap().push(access_token.to_string());
        stall(self.delay).await;
        self.outcome
            .clone()
            .map_err(|message| BadgeError::IdentityFetchFailed {
                provider: self.kind,
                message,
            })
    }
}

// ---------------------------------------------------------------------------
// FakeImageComposer
// ---------------------------------------------------------------------------

/// Image composer that "renders" to a fixed URL.
#[derive(Debug)]
pub struct FakeImageComposer {
    outcome: std::result::Result<String, String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<ImageRequest>>,
}

impl FakeImageComposer {
    pub fn returning(url: impl Into<String>) -> Self {
        Self {
            outcome: Ok(url.into()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Render requests received, in call order.
    pub fn calls(&self) -> Vec<ImageRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageComposer for FakeImageComposer {
    async fn compose(&self, request: &ImageRequest, _api_key: &str) -> Result<ComposedImage> {
        self.calls.lock().unwrap().push(request.clone());
        stall(self.delay).await;
        self.outcome
            .clone()
            .map(|url| ComposedImage { url })
            .map_err(BadgeError::ImageComposeFailed)
    }
}

// ---------------------------------------------------------------------------
// FakeStorageRelay
// ---------------------------------------------------------------------------

/// Storage relay that keeps submitted metadata in memory.
#[derive(Debug)]
pub struct FakeStorageRelay {
    outcome: std::result::Result<String, String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<BadgeMetadata>>,
}

impl FakeStorageRelay {
    /// Acknowledge every submission with `cid`.
    pub fn returning(cid: impl Into<String>) -> Self {
        Self {
            outcome: Ok(cid.into()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Metadata documents submitted, in call order.
    pub fn calls(&self) -> Vec<BadgeMetadata> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl StorageRelay for FakeStorageRelay {
    async fn submit(&self, metadata: &BadgeMetadata, _api_key: &str) -> Result<StorageReceipt> {
        self.calls.lock().unwrap().push(metadata.clone());
        stall(self.delay).await;
        self.outcome
            .clone()
            .map(|cid| StorageReceipt { cid })
            .map_err(BadgeError::StorageSubmitFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_identity_fake_records_tokens() {
        let profile = NormalizedProfile::new(ProviderKind::Google, "1", "Ada", "https://p");
        let fake = FakeIdentityProvider::returning(profile.clone());
        assert_eq!(fake.kind(), ProviderKind::Google);
        assert_eq!(fake.fetch_profile("tok-1").await.unwrap(), profile);
        assert_eq!(fake.calls(), vec!["tok-1".to_string()]);
    }

    #[tokio::test]
    async fn test_failing_fakes_map_to_stage_errors() {
        let identity = FakeIdentityProvider::failing(ProviderKind::GitHub, "Bad credentials");
        let err = identity.fetch_profile("t").await.unwrap_err();
        assert!(matches!(err, BadgeError::IdentityFetchFailed { .. }));

        let composer = FakeImageComposer::failing("quota exceeded");
        let request = ImageRequest {
            background_url: "b".to_string(),
            caption: "c".to_string(),
            label: "l".to_string(),
        };
        let err = composer.compose(&request, "k").await.unwrap_err();
        assert!(matches!(err, BadgeError::ImageComposeFailed(ref m) if m == "quota exceeded"));
        assert_eq!(composer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_storage_fake_keeps_metadata() {
        let relay = FakeStorageRelay::returning("bafy1");
        let metadata = BadgeMetadata {
            name: "n".to_string(),
            description: "d".to_string(),
            image: None,
            external_link: None,
            attributes: vec![],
        };
        let receipt = relay.submit(&metadata, "k").await.unwrap();
        assert_eq!(receipt.cid, "bafy1");
        assert_eq!(relay.calls(), vec![metadata]);
    }
}
