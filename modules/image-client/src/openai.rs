use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ImageError, Result};
use crate::util::{decode_image, ensure_success};
use crate::ImageSize;

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "dall-e-3";

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ImageRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub n: u32,
    pub size: String,
    pub response_format: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ImageResponse {
    #[serde(default)]
    pub data: Vec<ImageDatum>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ImageDatum {
    pub b64_json: Option<String>,
}

impl ImageResponse {
    fn first_image(self) -> Result<Bytes> {
        let encoded = self
            .data
            .into_iter()
            .find_map(|d| d.b64_json)
            .ok_or(ImageError::EmptyResponse)?;
        decode_image(&encoded)
    }
}

/// Synchronous OpenAI image generation (`/images/generations`, base64 response).
pub struct OpenAiImages {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiImages {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            base_url: OPENAI_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub async fn generate(&self, prompt: &str, size: ImageSize) -> Result<Bytes> {
        let url = format!("{}/images/generations", self.base_url);
        let request = ImageRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: size.as_dimensions(),
            response_format: "b64_json",
        };

        debug!(model = %self.model, "OpenAI image request");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let body: ImageResponse = resp.json().await?;
        body.first_image()
    }
}
