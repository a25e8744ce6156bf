//! Replicate predictions: submit returns immediately with a job handle, callers
//! poll `prediction()` until the job reaches a terminal state, then download
//! the output URL.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{ImageError, Result};
use crate::util::ensure_success;
use crate::ImageSize;

const REPLICATE_API_URL: &str = "https://api.replicate.com/v1";
const DEFAULT_MODEL: &str = "black-forest-labs/flux-schnell";

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PredictionRequest<'a> {
    pub input: PredictionInput<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PredictionInput<'a> {
    pub prompt: &'a str,
    pub width: u32,
    pub height: u32,
    pub num_outputs: u32,
    pub output_format: &'static str,
}

/// A prediction as returned by both the submit and status endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: String,
    /// A single URL or a list of URLs depending on the model.
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// Normalized job state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Succeeded { output_url: String },
    Failed { reason: String },
}

impl Prediction {
    pub fn state(&self) -> JobState {
        match self.status.as_str() {
            "succeeded" => match self.output_url() {
                Some(output_url) => JobState::Succeeded { output_url },
                None => JobState::Failed {
                    reason: "succeeded without output".to_string(),
                },
            },
            "failed" | "canceled" => JobState::Failed {
                reason: match &self.error {
                    Some(Value::String(msg)) => format!("{}: {}", self.status, msg),
                    _ => self.status.clone(),
                },
            },
            _ => JobState::Pending,
        }
    }

    fn output_url(&self) -> Option<String> {
        match self.output.as_ref()? {
            Value::String(url) => Some(url.clone()),
            Value::Array(items) => items.iter().find_map(|v| v.as_str().map(str::to_string)),
            _ => None,
        }
    }
}

/// Asynchronous Replicate image generation.
pub struct ReplicateImages {
    token: String,
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl ReplicateImages {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            http: reqwest::Client::new(),
            base_url: REPLICATE_API_URL.to_string(),
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

    /// Start a prediction. Returns immediately with the job handle.
    pub async fn submit(&self, prompt: &str, size: ImageSize) -> Result<Prediction> {
        let url = format!("{}/models/{}/predictions", self.base_url, self.model);
        let request = PredictionRequest {
            input: PredictionInput {
                prompt,
                width: size.width,
                height: size.height,
                num_outputs: 1,
                output_format: "png",
            },
        };

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let prediction: Prediction = resp.json().await?;
        debug!(id = %prediction.id, status = %prediction.status, "Replicate prediction submitted");
        Ok(prediction)
    }

    /// Read the current state of a prediction.
    pub async fn prediction(&self, id: &str) -> Result<Prediction> {
        let url = format!("{}/predictions/{}", self.base_url, id);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        Ok(resp.json().await?)
    }

    /// Download a finished output.
    pub async fn download(&self, output_url: &str) -> Result<Bytes> {
        let resp = self.http.get(output_url).send().await?;
        let resp = ensure_success(resp).await?;
        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Err(ImageError::EmptyResponse);
        }
        Ok(bytes)
    }
}
