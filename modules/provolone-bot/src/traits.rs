// Trait abstractions for the bot's external collaborators.
//
// SocialPlatform: comment reads and page posting (Facebook Graph in production).
// ImageProvider: one-shot "prompt in, image bytes out" capability; every
//   generation backend implements it, so the fallback chain is a plain list.
// ImageJobs: submit/poll/download for job-based backends; wrapped by
//   `generation::PolledProvider` to become an ImageProvider.
//
// Mocks for all three live in `testing.rs`.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use facebook_client::{Comment, FacebookClient};
use image_client::{ImageSize, JobState, OpenAiImages, ReplicateImages, StabilityImages};

// ---------------------------------------------------------------------------
// SocialPlatform
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SocialPlatform: Send + Sync {
    /// Fetch up to `limit` comments on a post.
    async fn comments(&self, post_id: &str, limit: u32) -> facebook_client::Result<Vec<Comment>>;

    /// Publish a text-only post. Returns the new post id.
    async fn post_message(&self, message: &str) -> facebook_client::Result<String>;

    /// Publish a post with an attached image. Returns the new post id.
    async fn post_photo(&self, message: &str, image: Bytes) -> facebook_client::Result<String>;
}

#[async_trait]
impl SocialPlatform for FacebookClient {
    async fn comments(&self, post_id: &str, limit: u32) -> facebook_client::Result<Vec<Comment>> {
        self.comments(post_id, limit).await
    }

    async fn post_message(&self, message: &str) -> facebook_client::Result<String> {
        self.post_message(message).await
    }

    async fn post_photo(&self, message: &str, image: Bytes) -> facebook_client::Result<String> {
        self.post_photo(message, image).await
    }
}

// ---------------------------------------------------------------------------
// ImageProvider
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Short stable name used in logs and archived file names.
    fn name(&self) -> &str;

    /// Attempt a single generation. Any error is a provider failure.
    async fn try_generate(&self, prompt: &str) -> Result<Bytes>;
}

#[async_trait]
impl ImageProvider for OpenAiImages {
    fn name(&self) -> &str {
        "openai"
    }

    async fn try_generate(&self, prompt: &str) -> Result<Bytes> {
        Ok(self.generate(prompt, ImageSize::SQUARE).await?)
    }
}

#[async_trait]
impl ImageProvider for StabilityImages {
    fn name(&self) -> &str {
        "stability"
    }

    async fn try_generate(&self, prompt: &str) -> Result<Bytes> {
        Ok(self.generate(prompt, ImageSize::SQUARE).await?)
    }
}

// ---------------------------------------------------------------------------
// ImageJobs
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ImageJobs: Send + Sync {
    fn name(&self) -> &str;

    /// Start a job. Returns the job handle.
    async fn submit(&self, prompt: &str) -> Result<String>;

    /// Current state of a submitted job.
    async fn status(&self, job_id: &str) -> Result<JobState>;

    /// Download a finished job's output.
    async fn fetch_output(&self, output_url: &str) -> Result<Bytes>;
}

#[async_trait]
impl ImageJobs for ReplicateImages {
    fn name(&self) -> &str {
        "replicate"
    }

    async fn submit(&self, prompt: &str) -> Result<String> {
        let prediction = ReplicateImages::submit(self, prompt, ImageSize::SQUARE).await?;
        Ok(prediction.id)
    }

    async fn status(&self, job_id: &str) -> Result<JobState> {
        Ok(self.prediction(job_id).await?.state())
    }

    async fn fetch_output(&self, output_url: &str) -> Result<Bytes> {
        Ok(self.download(output_url).await?)
    }
}
