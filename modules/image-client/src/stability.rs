use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ImageError, Result};
use crate::util::{decode_image, ensure_success};
use crate::ImageSize;

const STABILITY_API_URL: &str = "https://api.stability.ai/v1";
const DEFAULT_ENGINE: &str = "stable-diffusion-xl-1024-v1-0";

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TextToImageRequest<'a> {
    pub text_prompts: Vec<TextPrompt<'a>>,
    pub cfg_scale: f32,
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub steps: u32,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TextPrompt<'a> {
    pub text: &'a str,
    pub weight: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TextToImageResponse {
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Artifact {
    pub base64: Option<String>,
    #[serde(rename = "finishReason", default)]
    pub finish_reason: Option<String>,
}

impl TextToImageResponse {
    /// First artifact that finished cleanly. Content-filtered artifacts are
    /// blurred placeholders and are skipped.
    fn first_image(self) -> Result<Bytes> {
        let encoded = self
            .artifacts
            .into_iter()
            .filter(|a| a.finish_reason.as_deref().unwrap_or("SUCCESS") == "SUCCESS")
            .find_map(|a| a.base64)
            .ok_or(ImageError::EmptyResponse)?;
        decode_image(&encoded)
    }
}

/// Synchronous Stability text-to-image generation.
pub struct StabilityImages {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
    engine: String,
}

impl StabilityImages {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            base_url: STABILITY_API_URL.to_string(),
            engine: DEFAULT_ENGINE.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn with_engine(mut self, engine: &str) -> Self {
        self.engine = engine.to_string();
        self
    }

    pub async fn generate(&self, prompt: &str, size: ImageSize) -> Result<Bytes> {
        let url = format!(
            "{}/generation/{}/text-to-image",
            self.base_url, self.engine
        );
        let request = TextToImageRequest {
            text_prompts: vec![TextPrompt {
                text: prompt,
                weight: 1.0,
            }],
            cfg_scale: 7.0,
            width: size.width,
            height: size.height,
            samples: 1,
            steps: 30,
        };

        debug!(engine = %self.engine, "Stability image request");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let body: TextToImageResponse = resp.json().await?;
        body.first_image()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filtered_artifacts_are_skipped() {
        let resp: TextToImageResponse = serde_json::from_str(
            r#"{"artifacts": [
                {"base64": "Ymx1cnJlZA==", "finishReason": "CONTENT_FILTERED"},
                {"base64": "aGVsbG8=", "finishReason": "SUCCESS"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(resp.first_image().unwrap().as_ref(), b"hello");
    }

    #[test]
    fn no_artifacts_is_empty() {
        let resp: TextToImageResponse = serde_json::from_str(r#"{"artifacts": []}"#).unwrap();
        assert!(matches!(resp.first_image(), Err(ImageError::EmptyResponse)));
    }
}
