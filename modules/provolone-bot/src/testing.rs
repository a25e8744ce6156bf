// Test mocks for the bot.
//
// Three mocks matching the three trait boundaries:
// - MockPlatform (SocialPlatform): HashMap-based post→comments, records publishes
// - StaticProvider / FailingProvider (ImageProvider): fixed outcome, call counting
// - MockJobs (ImageJobs): scripted job states
//
// Plus helpers for building a BotContext in a temp dir and Comment fixtures.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use bytes::Bytes;

use facebook_client::{Comment, FacebookError};
use image_client::JobState;

use crate::context::BotContext;
use crate::traits::{ImageJobs, ImageProvider, SocialPlatform};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A context rooted in a fresh temp dir. Keep the `TempDir` alive for the
/// duration of the test.
pub fn test_context() -> (tempfile::TempDir, BotContext) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let ctx = BotContext::new(dir.path()).expect("create bot context");
    (dir, ctx)
}

pub fn comment(id: &str, text: &str, likes: u32) -> Comment {
    Comment {
        id: id.to_string(),
        message: text.to_string(),
        like_count: likes,
        created_time: None,
        from: None,
    }
}

/// Shared call counter handed out before a mock is moved into a generator.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicU32>);

impl CallCounter {
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// MockPlatform
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub post_id: String,
    pub message: String,
    pub with_image: bool,
}

/// In-memory page. Unregistered posts have no comments.
/// Builder pattern: `.on_comments()`, `.fail_comments()`, `.fail_posts()`.
pub struct MockPlatform {
    comments: HashMap<String, Vec<Comment>>,
    failing_comments: HashSet<String>,
    fail_posts: bool,
    published: Mutex<Vec<PublishedPost>>,
    comment_requests: Mutex<Vec<String>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            comments: HashMap::new(),
            failing_comments: HashSet::new(),
            fail_posts: false,
            published: Mutex::new(Vec::new()),
            comment_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn on_comments(mut self, post_id: &str, comments: Vec<Comment>) -> Self {
        self.comments.insert(post_id.to_string(), comments);
        self
    }

    pub fn fail_comments(mut self, post_id: &str) -> Self {
        self.failing_comments.insert(post_id.to_string());
        self
    }

    /// Every publish is rejected with a 500.
    pub fn fail_posts(mut self) -> Self {
        self.fail_posts = true;
        self
    }

    pub fn published(&self) -> Vec<PublishedPost> {
        self.published.lock().unwrap().clone()
    }

    /// Post ids whose comments were requested, in request order.
    pub fn comment_requests(&self) -> Vec<String> {
        self.comment_requests.lock().unwrap().clone()
    }

    fn publish(&self, message: &str, with_image: bool) -> facebook_client::Result<String> {
        if self.fail_posts {
            return Err(FacebookError::Api {
                status: 500,
                message: "mock outage".to_string(),
            });
        }
        let mut published = self.published.lock().unwrap();
        let post_id = format!("page_post_{}", published.len() + 1);
        published.push(PublishedPost {
            post_id: post_id.clone(),
            message: message.to_string(),
            with_image,
        });
        Ok(post_id)
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SocialPlatform for MockPlatform {
    async fn comments(&self, post_id: &str, _limit: u32) -> facebook_client::Result<Vec<Comment>> {
        self.comment_requests
            .lock()
            .unwrap()
            .push(post_id.to_string());
        if self.failing_comments.contains(post_id) {
            return Err(FacebookError::Network(format!(
                "MockPlatform: comments unavailable for {post_id}"
            )));
        }
        Ok(self.comments.get(post_id).cloned().unwrap_or_default())
    }

    async fn post_message(&self, message: &str) -> facebook_client::Result<String> {
        self.publish(message, false)
    }

    async fn post_photo(&self, message: &str, _image: Bytes) -> facebook_client::Result<String> {
        self.publish(message, true)
    }
}

// ---------------------------------------------------------------------------
// Image providers
// ---------------------------------------------------------------------------

/// Always returns the same bytes.
pub struct StaticProvider {
    name: String,
    image: Bytes,
    calls: CallCounter,
}

impl StaticProvider {
    pub fn new(name: &str, image: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            image: Bytes::copy_from_slice(image),
            calls: CallCounter::default(),
        }
    }

    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

#[async_trait]
impl ImageProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn try_generate(&self, _prompt: &str) -> Result<Bytes> {
        self.calls.bump();
        Ok(self.image.clone())
    }
}

/// Always fails.
pub struct FailingProvider {
    name: String,
    calls: CallCounter,
}

impl FailingProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: CallCounter::default(),
        }
    }

    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

#[async_trait]
impl ImageProvider for FailingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn try_generate(&self, _prompt: &str) -> Result<Bytes> {
        self.calls.bump();
        bail!("FailingProvider {}: simulated failure", self.name)
    }
}

// ---------------------------------------------------------------------------
// MockJobs
// ---------------------------------------------------------------------------

/// Job backend that replays scripted states, then reports `Pending` forever.
/// `fetch_output` echoes the output URL back as the image bytes.
pub struct MockJobs {
    name: String,
    states: Mutex<VecDeque<JobState>>,
    status_calls: CallCounter,
}

impl MockJobs {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            states: Mutex::new(VecDeque::new()),
            status_calls: CallCounter::default(),
        }
    }

    pub fn then(self, states: Vec<JobState>) -> Self {
        self.states.lock().unwrap().extend(states);
        self
    }

    pub fn status_calls(&self) -> CallCounter {
        self.status_calls.clone()
    }
}

#[async_trait]
impl ImageJobs for MockJobs {
    fn name(&self) -> &str {
        &self.name
    }

    async fn submit(&self, _prompt: &str) -> Result<String> {
        Ok(format!("{}-job-1", self.name))
    }

    async fn status(&self, _job_id: &str) -> Result<JobState> {
        self.status_calls.bump();
        Ok(self
            .states
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(JobState::Pending))
    }

    async fn fetch_output(&self, output_url: &str) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(output_url.as_bytes()))
    }
}
