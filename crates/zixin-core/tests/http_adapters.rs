//! HTTP adapters exercised against a local one-shot server.
//!
//! Each stub accepts a single connection, captures the raw request and
//! answers with a canned status and JSON body.

use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use zixin_core::{
    ApiTemplateComposer, BadgeError, BadgeMetadata, BadgePipeline, BuiltinProgram,
    CredentialName, Credentials, FacebookAdapter, GitHubAdapter, HttpStorageRelay,
    IdentityProvider, ImageComposer, ImageRequest, PipelineConfig, PipelineResult, ProviderKind,
    Stage, StorageRelay,
};

/// A stub bound to an ephemeral port, serving one response.
struct Stub {
    url: String,
    request: JoinHandle<String>,
}

impl Stub {
    async fn serve(status: u16, body: String) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/endpoint", listener.local_addr().unwrap());
        let request = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let raw = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            raw
        });
        Self { url, request }
    }

    /// The raw request the stub received.
    async fn received(self) -> String {
        self.request.await.unwrap()
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// A URL nothing listens on.
async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/endpoint")
}

fn image_request() -> ImageRequest {
    ImageRequest {
        background_url: "https://avatars.example/u/1".to_string(),
        caption: "octocat".to_string(),
        label: "Github | Zixin".to_string(),
    }
}

fn metadata() -> BadgeMetadata {
    BadgeMetadata {
        name: "Zixin | Github |octocat".to_string(),
        description: "GitHub mascot".to_string(),
        image: Some("https://cdn.example/badge.png".to_string()),
        external_link: None,
        attributes: vec![],
    }
}

/// A 401 from GitHub becomes IdentityFetchFailed with the body kept whole.
#[tokio::test]
async fn test_github_rejection_maps_to_identity_fetch_failed() {
    let body = json!({
        "message": "Bad credentials",
        "documentation_url": "https://docs.github.com/rest"
    })
    .to_string();
    let stub = Stub::serve(401, body.clone()).await;
    let adapter = GitHubAdapter::new(reqwest::Client::new(), stub.url.clone());

    let err = adapter.fetch_profile("gho_bad").await.unwrap_err();
    match err {
        BadgeError::IdentityFetchFailed { provider, message } => {
            assert_eq!(provider, ProviderKind::GitHub);
            assert_eq!(message, format!("status 401: {body}"));
        }
        other => panic!("expected IdentityFetchFailed, got {other:?}"),
    }

    let request = stub.received().await.to_ascii_lowercase();
    assert!(request.starts_with("get /endpoint"));
    assert!(request.contains("authorization: bearer gho_bad"));
}

/// A 2xx Graph API body with an `error` object is still a failure.
#[tokio::test]
async fn test_facebook_error_field_maps_to_identity_fetch_failed() {
    let body = json!({
        "error": {"message": "Invalid OAuth access token.", "type": "OAuthException", "code": 190}
    })
    .to_string();
    let stub = Stub::serve(200, body).await;
    let adapter = FacebookAdapter::new(reqwest::Client::new(), stub.url.clone());

    let err = adapter.fetch_profile("EAAB").await.unwrap_err();
    match err {
        BadgeError::IdentityFetchFailed { provider, message } => {
            assert_eq!(provider, ProviderKind::Facebook);
            assert!(message.contains(r#""code":190"#));
            assert!(message.contains("OAuthException"));
        }
        other => panic!("expected IdentityFetchFailed, got {other:?}"),
    }

    let request = stub.received().await;
    assert!(request.contains("access_token=EAAB"));
    assert!(request.contains("fields=id%2Cname%2Cpicture"));
}

/// A successful GitHub answer is normalized.
#[tokio::test]
async fn test_github_success_is_normalized() {
    let body = json!({
        "login": "octocat",
        "id": 583231,
        "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
        "followers": 9,
        "bio": null
    })
    .to_string();
    let stub = Stub::serve(200, body).await;
    let adapter = GitHubAdapter::new(reqwest::Client::new(), stub.url.clone());

    let profile = adapter.fetch_profile("gho_ok").await.unwrap();
    assert_eq!(profile.id, "583231");
    assert_eq!(profile.display_name, "octocat");
    assert_eq!(profile.attributes.followers, Some(9));
    stub.received().await;
}

/// The image service's 200 `"status": "error"` is a compose failure.
#[tokio::test]
async fn test_image_status_error_maps_to_image_compose_failed() {
    let stub = Stub::serve(
        200,
        json!({"status": "error", "message": "Invalid template"}).to_string(),
    )
    .await;
    let composer = ApiTemplateComposer::new(
        reqwest::Client::new(),
        stub.url.clone(),
        "1c077b23aaf7c198".to_string(),
    );

    let err = composer
        .compose(&image_request(), "img-key")
        .await
        .unwrap_err();
    match err {
        BadgeError::ImageComposeFailed(message) => {
            assert!(message.contains(r#""status":"error""#));
            assert!(message.contains("Invalid template"));
        }
        other => panic!("expected ImageComposeFailed, got {other:?}"),
    }

    let request = stub.received().await;
    assert!(request.to_ascii_lowercase().contains("authorization: token img-key"));
    assert!(request.contains("template_id=1c077b23aaf7c198"));
    assert!(request.contains("expiration=0"));
}

/// The relay's `value.cid` becomes the receipt.
#[tokio::test]
async fn test_relay_success_returns_cid() {
    let stub = Stub::serve(
        200,
        json!({"ok": true, "value": {"cid": "bafyrelay"}}).to_string(),
    )
    .await;
    let relay = HttpStorageRelay::new(reqwest::Client::new(), stub.url.clone());

    let receipt = relay.submit(&metadata(), "store-key").await.unwrap();
    assert_eq!(receipt.cid, "bafyrelay");

    let request = stub.received().await;
    assert!(request.to_ascii_lowercase().contains("authorization: bearer store-key"));
    assert!(request.contains(r#""metadataString":"#));
    assert!(request.contains("Zixin | Github |octocat"));
}

/// A relay 401 surfaces its raw payload as StorageSubmitFailed.
#[tokio::test]
async fn test_relay_rejection_keeps_raw_payload() {
    let body = json!({
        "ok": false,
        "error": {"name": "HTTPError", "message": "Unauthorized", "code": 401}
    })
    .to_string();
    let stub = Stub::serve(401, body.clone()).await;
    let relay = HttpStorageRelay::new(reqwest::Client::new(), stub.url.clone());

    let err = relay.submit(&metadata(), "bad-key").await.unwrap_err();
    match err {
        BadgeError::StorageSubmitFailed(message) => {
            assert_eq!(message, format!("status 401: {body}"));
        }
        other => panic!("expected StorageSubmitFailed, got {other:?}"),
    }
    stub.received().await;
}

/// An unreachable relay is a Transport error tagged with its stage.
#[tokio::test]
async fn test_unreachable_relay_is_transport_error() {
    let relay = HttpStorageRelay::new(reqwest::Client::new(), closed_url().await);

    let err = relay.submit(&metadata(), "store-key").await.unwrap_err();
    match err {
        BadgeError::Transport { stage, .. } => assert_eq!(stage, Stage::StoringMetadata),
        other => panic!("expected Transport, got {other:?}"),
    }
}

/// Transport errors never echo the request URL, which can carry a token.
#[tokio::test]
async fn test_unreachable_facebook_hides_token() {
    let adapter = FacebookAdapter::new(reqwest::Client::new(), closed_url().await);

    let err = adapter.fetch_profile("EAAsecret").await.unwrap_err();
    assert_eq!(err.stage(), Some(Stage::FetchingIdentity));
    assert_eq!(err.kind(), "transport_error");
    assert!(!err.to_string().contains("EAAsecret"));
}

/// The HTTP-wired pipeline issues a badge end to end.
#[tokio::test]
async fn test_pipeline_from_config_over_http() {
    let github = Stub::serve(
        200,
        json!({
            "login": "octocat",
            "id": 583231,
            "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
            "bio": "GitHub mascot",
            "followers": 12
        })
        .to_string(),
    )
    .await;
    let image = Stub::serve(
        200,
        json!({"status": "success", "download_url_png": "https://cdn.example/badge.png"})
            .to_string(),
    )
    .await;
    let relay = Stub::serve(200, json!({"value": {"cid": "abc123"}}).to_string()).await;

    let mut config = PipelineConfig::default();
    config.endpoints.github_user_url = github.url.clone();
    config.endpoints.image_service_url = image.url.clone();
    config.endpoints.storage_relay_url = relay.url.clone();

    let pipeline = BadgePipeline::from_config(ProviderKind::GitHub, config).unwrap();
    let credentials = Credentials::new()
        .with(CredentialName::AccessToken, "gho_ok")
        .with(CredentialName::ImageApiKey, "img-key")
        .with(CredentialName::StorageApiKey, "store-key");
    let report = pipeline
        .run(&BuiltinProgram::GitHubMrPopular.program(), &credentials)
        .await
        .unwrap();

    assert_eq!(
        report.result,
        PipelineResult::Uri("https://abc123.ipfs.nftstorage.link/metadata.json".to_string())
    );
    assert!(github
        .received()
        .await
        .to_ascii_lowercase()
        .contains("user-agent: zixin/"));
    assert!(image.received().await.contains("Mr. Popular"));
    assert!(relay.received().await.contains("Shiji | Github |octocat"));
}

/// Shared adapters behind trait objects behave the same.
#[tokio::test]
async fn test_adapter_for_dispatches_on_kind() {
    let stub = Stub::serve(401, r#"{"error":"invalid_token"}"#.to_string()).await;
    let mut config = PipelineConfig::default();
    config.endpoints.google_userinfo_url = stub.url.clone();

    let adapter: Arc<dyn IdentityProvider> =
        zixin_core::provider::adapter_for(ProviderKind::Google, &config, reqwest::Client::new());
    assert_eq!(adapter.kind(), ProviderKind::Google);

    let err = adapter.fetch_profile("ya29.bad").await.unwrap_err();
    assert!(matches!(
        err,
        BadgeError::IdentityFetchFailed { provider: ProviderKind::Google, ref message }
            if message.contains("invalid_token")
    ));
    stub.received().await;
}
