//! Image generation with ordered provider fallback.
//!
//! Providers are tried strictly in order; the first success wins and later
//! providers are never called. A provider is attempted at most once per
//! `generate` call. When every provider fails (or none is configured) the
//! caller gets `None` and publishes text only.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info, warn};

use image_client::{JobState, OpenAiImages, ReplicateImages, StabilityImages};
use provolone_common::{Config, ProvoloneError};

use crate::context::BotContext;
use crate::infra::activity_log::ActivityEvent;
use crate::infra::util::file_timestamp;
use crate::traits::{ImageJobs, ImageProvider};

/// Delay between status checks on a job-based provider.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Status checks before a job-based provider is considered timed out.
pub const MAX_POLL_ATTEMPTS: u32 = 30;

// ---------------------------------------------------------------------------
// PolledProvider
// ---------------------------------------------------------------------------

/// Adapts a submit/poll/download backend into a one-shot [`ImageProvider`].
///
/// The poll loop sleeps, checks, and repeats up to `max_attempts` times. It
/// cannot be cancelled once started; exhausting the budget is a timeout and
/// counts as a provider failure.
pub struct PolledProvider<J> {
    jobs: J,
    poll_interval: Duration,
    max_attempts: u32,
}

impl<J: ImageJobs> PolledProvider<J> {
    pub fn new(jobs: J) -> Self {
        Self {
            jobs,
            poll_interval: POLL_INTERVAL,
            max_attempts: MAX_POLL_ATTEMPTS,
        }
    }

    pub fn with_polling(mut self, poll_interval: Duration, max_attempts: u32) -> Self {
        self.poll_interval = poll_interval;
        self.max_attempts = max_attempts;
        self
    }

    pub fn jobs(&self) -> &J {
        &self.jobs
    }
}

#[async_trait]
impl<J: ImageJobs> ImageProvider for PolledProvider<J> {
    fn name(&self) -> &str {
        self.jobs.name()
    }

    async fn try_generate(&self, prompt: &str) -> Result<Bytes> {
        let job_id = self.jobs.submit(prompt).await?;
        debug!(provider = self.name(), job_id = %job_id, "Job submitted, polling");

        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(self.poll_interval).await;
            match self.jobs.status(&job_id).await? {
                JobState::Pending => {
                    debug!(provider = self.name(), attempt, "Job still running");
                }
                JobState::Succeeded { output_url } => {
                    return self.jobs.fetch_output(&output_url).await;
                }
                JobState::Failed { reason } => {
                    bail!("job {job_id} failed: {reason}");
                }
            }
        }

        Err(ProvoloneError::ProviderTimeout {
            provider: self.name().to_string(),
            attempts: self.max_attempts,
        }
        .into())
    }
}

// ---------------------------------------------------------------------------
// ImageGenerator
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ImageGenerator {
    providers: Vec<Box<dyn ImageProvider>>,
}

impl ImageGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider at the lowest priority so far.
    pub fn with_provider(mut self, provider: impl ImageProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// OpenAI, then Stability, then Replicate, each only if its key is set.
    pub fn from_config(config: &Config) -> Self {
        let mut generator = Self::new();
        if let Some(key) = &config.openai_api_key {
            generator = generator.with_provider(OpenAiImages::new(key));
        }
        if let Some(key) = &config.stability_api_key {
            generator = generator.with_provider(StabilityImages::new(key));
        }
        if let Some(token) = &config.replicate_api_token {
            generator = generator.with_provider(PolledProvider::new(ReplicateImages::new(token)));
        }
        generator
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// First provider success, archived under `generated_images/` before it
    /// is returned. `None` means every provider failed or none is configured.
    pub async fn generate(&self, prompt: &str, ctx: &BotContext) -> Option<Bytes> {
        for provider in &self.providers {
            let name = provider.name();
            match provider.try_generate(prompt).await {
                Ok(image) => {
                    info!(provider = name, bytes = image.len(), "Image generated");
                    match archive_image(ctx, name, &image) {
                        Ok(path) => ctx.record(ActivityEvent::ImageGenerated {
                            provider: name.to_string(),
                            path,
                        }),
                        Err(e) => warn!(provider = name, error = %e, "Failed to archive image"),
                    }
                    return Some(image);
                }
                Err(e) => {
                    warn!(provider = name, error = %e, "Image provider failed");
                    ctx.record(ActivityEvent::ImageProviderFailed {
                        provider: name.to_string(),
                        error: format!("{e:#}"),
                    });
                }
            }
        }

        ctx.record(ActivityEvent::ImagesExhausted);
        None
    }
}

fn archive_image(ctx: &BotContext, provider: &str, image: &[u8]) -> Result<PathBuf> {
    let dir = ctx.paths.images_dir();
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(format!("image_{}_{}.png", file_timestamp(Utc::now()), provider));
    std::fs::write(&path, image).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
