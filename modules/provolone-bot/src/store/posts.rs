use std::path::Path;

use anyhow::{Context, Result};

use provolone_common::TrackedPost;

use super::write_json;

/// Only the most recent posts are kept for comment mining.
pub const MAX_TRACKED_POSTS: usize = 10;

/// Bounded FIFO history of published posts.
#[derive(Debug, Clone, Default)]
pub struct TrackedPosts {
    posts: Vec<TrackedPost>,
}

impl TrackedPosts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the full history from disk. A missing file is an empty history.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let posts: Vec<TrackedPost> = serde_json::from_str(&json)
            .with_context(|| format!("parsing {}", path.display()))?;
        let mut tracked = Self { posts };
        tracked.evict_oldest();
        Ok(tracked)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, &self.posts)
    }

    /// Append a post, evicting the oldest entries beyond the cap.
    pub fn track(&mut self, post: TrackedPost) {
        self.posts.push(post);
        self.evict_oldest();
    }

    pub fn posts(&self) -> &[TrackedPost] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Ids of posts not yet mined, oldest first.
    pub fn unexamined(&self) -> Vec<String> {
        self.posts
            .iter()
            .filter(|p| !p.examined)
            .map(|p| p.post_id.clone())
            .collect()
    }

    /// Flag a post as mined. Returns false if it was unknown or already mined.
    pub fn mark_examined(&mut self, post_id: &str) -> bool {
        match self
            .posts
            .iter_mut()
            .find(|p| p.post_id == post_id && !p.examined)
        {
            Some(post) => {
                post.examined = true;
                true
            }
            None => false,
        }
    }

    fn evict_oldest(&mut self) {
        if self.posts.len() > MAX_TRACKED_POSTS {
            let excess = self.posts.len() - MAX_TRACKED_POSTS;
            self.posts.drain(..excess);
        }
    }
}
