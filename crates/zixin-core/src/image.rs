//! Badge image composition through an external templating service.
//!
//! The service renders a fixed template with three overlays, always sent in
//! the same order: the background image, the primary caption, and the
//! provider label. Styling is constant across programs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::PipelineConfig;
use crate::error::{BadgeError, Result};
use crate::http::{self, Reply};
use crate::stage::Stage;

/// Stroke drawn around the background image.
pub const BACKGROUND_STROKE: &str = "grey";
/// Font size of the primary caption.
pub const CAPTION_FONT_SIZE: u32 = 60;
/// Font size of the provider label.
pub const LABEL_FONT_SIZE: u32 = 55;
/// Text background of the primary caption.
pub const CAPTION_BACKGROUND: &str = "rgba(0,0,0)";
/// Text background of the provider label.
pub const LABEL_BACKGROUND: &str = "rgba(0, 0, 0)";

/// Inputs of one render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    /// Image drawn behind the captions.
    pub background_url: String,
    /// Main text, usually the user's display name.
    pub caption: String,
    /// Fixed provider/program label, e.g. `Github | Zixin`.
    pub label: String,
}

/// A rendered badge image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedImage {
    /// Retrieval URL of the rendered PNG.
    pub url: String,
}

/// Renders badge images.
#[async_trait]
pub trait ImageComposer: Send + Sync {
    /// Render `request`, authenticating with `api_key`.
    async fn compose(&self, request: &ImageRequest, api_key: &str) -> Result<ComposedImage>;
}

/// APITemplate.io `create-image` client.
pub struct ApiTemplateComposer {
    client: reqwest::Client,
    endpoint: String,
    template_id: String,
}

impl ApiTemplateComposer {
    pub fn new(client: reqwest::Client, endpoint: String, template_id: String) -> Self {
        Self {
            client,
            endpoint,
            template_id,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &PipelineConfig) -> Self {
        Self::new(
            client,
            config.endpoints.image_service_url.clone(),
            config.endpoints.image_template_id.clone(),
        )
    }

    fn build_request(&self, request: &ImageRequest, api_key: &str) -> reqwest::RequestBuilder {
        self.client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("Token {api_key}"))
            .query(&[("template_id", self.template_id.as_str()), ("expiration", "0")])
            .json(&overrides_body(request))
    }
}

#[async_trait]
impl ImageComposer for ApiTemplateComposer {
    async fn compose(&self, request: &ImageRequest, api_key: &str) -> Result<ComposedImage> {
        let outgoing = self.build_request(request, api_key);
        match http::dispatch(outgoing, Stage::ComposingImage).await? {
            Reply::Accepted(body) => parse_composed(&body).map_err(BadgeError::ImageComposeFailed),
            Reply::Rejected(message) => Err(BadgeError::ImageComposeFailed(message)),
        }
    }
}

/// JSON body carrying the three overlays in their fixed order.
pub fn overrides_body(request: &ImageRequest) -> Value {
    json!({
        "overrides": [
            {
                "name": "background-image",
                "stroke": BACKGROUND_STROKE,
                "src": request.background_url,
            },
            {
                "name": "text_quote",
                "text": request.caption,
                "fontSize": CAPTION_FONT_SIZE,
                "textBackgroundColor": CAPTION_BACKGROUND,
            },
            {
                "name": "text_tags",
                "text": request.label,
                "fontSize": LABEL_FONT_SIZE,
                "textBackgroundColor": LABEL_BACKGROUND,
            },
        ]
    })
}

/// Extract the PNG URL from a `create-image` response.
///
/// The service can answer 200 with `"status": "error"`; that is a failure
/// carrying the whole response body.
pub fn parse_composed(body: &Value) -> std::result::Result<ComposedImage, String> {
    if body.get("status").and_then(Value::as_str) == Some("error") {
        return Err(body.to_string());
    }

    body.get("download_url_png")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(|url| ComposedImage {
            url: url.to_string(),
        })
        .ok_or_else(|| "response missing download_url_png".to_string())
}
