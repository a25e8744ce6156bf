//! File-backed state: the venue list and the tracked-post history.
//!
//! Both follow the same best-effort model: load the whole file once, mutate
//! in memory, rewrite the whole file after every mutation. There is no
//! locking and no journal; a crash between a mutation and its rewrite loses
//! that mutation.

pub mod posts;
pub mod venues;

pub use posts::{TrackedPosts, MAX_TRACKED_POSTS};
pub use venues::{seed_venues, VenueCounts, VenueStore};

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Serialize `value` as pretty JSON and replace `path` wholesale.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}
