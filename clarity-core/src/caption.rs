use crate::model::CaptionResult;
use image::RgbImage;
use serde_json::Value;
use std::future::Future;
use std::io::Cursor;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_VISION_BASE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_VISION_MODEL: &str = "Salesforce/blip-image-captioning-base";

/// Explicit vision model configuration, passed at construction time.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl VisionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_VISION_MODEL.to_string(),
            base_url: DEFAULT_VISION_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("unsupported image format")]
    Unsupported,

    #[error("image fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Black-box vision-captioning seam: one decoded image in, one caption
/// out. Inference is read-only; calls are made strictly sequentially.
pub trait CaptionModel {
    fn caption(&self, image: &RgbImage) -> impl Future<Output = Result<String, CaptionError>> + Send;
}

/// Hosted BLIP captioning client (Hugging Face inference by default).
pub struct BlipCaptionClient {
    client: reqwest::Client,
    config: VisionConfig,
}

impl BlipCaptionClient {
    pub fn new(config: VisionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

impl CaptionModel for BlipCaptionClient {
    async fn caption(&self, image: &RgbImage) -> Result<String, CaptionError> {
        let mut encoded = Vec::new();
        image.write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png)?;

        let endpoint = format!(
            "{}/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        debug!("Requesting caption from {}", endpoint);

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(encoded)
            .send()
            .await?
            .error_for_status()?;

        let payload: Value = response.json().await?;
        payload
            .pointer("/0/generated_text")
            .and_then(Value::as_str)
            .map(|caption| caption.trim().to_string())
            .ok_or_else(|| {
                CaptionError::Inference("missing generated_text in response".to_string())
            })
    }
}

/// Per-image caption remediation. `caption` is infallible by design:
/// every internal error is folded into a failure-marker `CaptionResult`
/// so one image can never abort a batch.
pub struct CaptionGenerator<M: CaptionModel> {
    client: reqwest::Client,
    model: M,
}

impl<M: CaptionModel> CaptionGenerator<M> {
    pub fn new(model: M) -> Self {
        Self {
            client: reqwest::Client::new(),
            model,
        }
    }

    pub async fn caption(&self, img_url: &str) -> CaptionResult {
        match self.try_caption(img_url).await {
            Ok(caption) => {
                debug!("Captioned {}: {}", img_url, caption);
                CaptionResult::captioned(img_url, caption)
            }
            Err(e) => {
                warn!("Caption failed for {}: {}", img_url, e);
                CaptionResult::failed(img_url, e)
            }
        }
    }

    async fn try_caption(&self, img_url: &str) -> Result<String, CaptionError> {
        // Vector and data-URI inputs that reach this far fail fast,
        // without an HTTP round trip.
        if img_url.starts_with("data:") || img_url.to_ascii_lowercase().ends_with(".svg") {
            return Err(CaptionError::Unsupported);
        }

        let bytes = self
            .client
            .get(img_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let decoded = image::load_from_memory(&bytes)?.to_rgb8();
        self.model.caption(&decoded).await
    }
}
