//! Activity log: append-only audit trail of every mining decision, store
//! mutation and publish attempt.
//!
//! Each event is one line, `[YYYY-mm-dd HH:MM:SS] MESSAGE`, appended to
//! `{DATA_DIR}/logs/sandwich_shop_activity.log`. The file is never truncated.
//! Timestamps never go backwards within a process, even if the wall clock does.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{error, info};

use provolone_common::AddedBy;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// ActivityEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ActivityEvent {
    PostCreated {
        post_id: String,
        preview: String,
    },
    PostFailed {
        reason: String,
    },
    PostSaved {
        path: PathBuf,
    },
    CheckingComments {
        post_id: String,
        found: usize,
        qualifying: usize,
    },
    CommentCheckFailed {
        post_id: String,
        error: String,
    },
    RecentPostsFailed {
        error: String,
    },
    NotRecommendation {
        comment_id: String,
    },
    NoNameFound {
        comment_id: String,
    },
    CandidateExtracted {
        comment_id: String,
        name: String,
    },
    ShopAdded {
        name: String,
        added_by: AddedBy,
    },
    DuplicateIgnored {
        name: String,
    },
    CommunityShopAdded {
        name: String,
        likes: u32,
    },
    StoreSaveFailed {
        error: String,
    },
    ImageGenerated {
        provider: String,
        path: PathBuf,
    },
    ImageProviderFailed {
        provider: String,
        error: String,
    },
    ImagesExhausted,
    ReportGenerated {
        path: PathBuf,
    },
    ReportFailed {
        error: String,
    },
}

impl fmt::Display for ActivityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityEvent::PostCreated { post_id, preview } => {
                write!(f, "POST CREATED: {post_id} - {preview}...")
            }
            ActivityEvent::PostFailed { reason } => write!(f, "POST FAILED: {reason}"),
            ActivityEvent::PostSaved { path } => {
                write!(f, "POST SAVED FOR RECOVERY: {}", path.display())
            }
            ActivityEvent::CheckingComments {
                post_id,
                found,
                qualifying,
            } => write!(
                f,
                "CHECKING COMMENTS: Found {found} comments on post {post_id} ({qualifying} with enough likes)"
            ),
            ActivityEvent::CommentCheckFailed { post_id, error } => {
                write!(f, "ERROR CHECKING COMMENTS: post {post_id}: {error}")
            }
            ActivityEvent::RecentPostsFailed { error } => {
                write!(f, "ERROR CHECKING RECENT POSTS: {error}")
            }
            ActivityEvent::NotRecommendation { comment_id } => {
                write!(f, "COMMENT SKIPPED: {comment_id} does not look like a recommendation")
            }
            ActivityEvent::NoNameFound { comment_id } => {
                write!(f, "NO SHOP NAME FOUND: comment {comment_id}")
            }
            ActivityEvent::CandidateExtracted { comment_id, name } => {
                write!(f, "CANDIDATE EXTRACTED: {name} from comment {comment_id}")
            }
            ActivityEvent::ShopAdded { name, added_by } => {
                write!(f, "NEW SHOP ADDED: {name} (by {added_by})")
            }
            ActivityEvent::DuplicateIgnored { name } => {
                write!(f, "DUPLICATE SHOP IGNORED: {name}")
            }
            ActivityEvent::CommunityShopAdded { name, likes } => {
                write!(f, "COMMUNITY SHOP ADDED: {name} ({likes} likes)")
            }
            ActivityEvent::StoreSaveFailed { error } => write!(f, "ERROR SAVING SHOPS: {error}"),
            ActivityEvent::ImageGenerated { provider, path } => {
                write!(f, "IMAGE GENERATED: {provider} -> {}", path.display())
            }
            ActivityEvent::ImageProviderFailed { provider, error } => {
                write!(f, "IMAGE PROVIDER FAILED: {provider}: {error}")
            }
            ActivityEvent::ImagesExhausted => {
                write!(f, "IMAGE GENERATION EXHAUSTED: publishing text only")
            }
            ActivityEvent::ReportGenerated { path } => {
                write!(f, "REPORT GENERATED: {}", path.display())
            }
            ActivityEvent::ReportFailed { error } => write!(f, "ERROR GENERATING REPORT: {error}"),
        }
    }
}

// ---------------------------------------------------------------------------
// ActivityLog
// ---------------------------------------------------------------------------

pub struct ActivityLog {
    path: PathBuf,
    last: Mutex<Option<NaiveDateTime>>,
}

impl ActivityLog {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            last: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event. Write failures are reported through tracing and
    /// otherwise swallowed: the audit trail must never abort a run.
    pub fn record(&self, event: ActivityEvent) {
        let ts = self.next_timestamp(Utc::now());
        let message = event.to_string().replace(['\n', '\r'], " ");
        let line = format!("[{}] {}\n", ts.format(TIMESTAMP_FORMAT), message);

        if let Err(e) = self.append(&line) {
            error!(path = %self.path.display(), error = %e, "Failed to write activity log");
        }
        info!("📝 {message}");
    }

    /// All lines written so far.
    pub fn entries(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        Ok(contents.lines().map(str::to_string).collect())
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }

    fn next_timestamp(&self, now: DateTime<Utc>) -> NaiveDateTime {
        let now = now.naive_utc();
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let ts = match *last {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        *last = Some(ts);
        ts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn lines_are_appended_with_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let log = ActivityLog::new(dir.path().join("logs").join("activity.log"));

        log.record(ActivityEvent::DuplicateIgnored {
            name: "Tony's Deli".to_string(),
        });
        log.record(ActivityEvent::ShopAdded {
            name: "Mario's Subs".to_string(),
            added_by: AddedBy::Community,
        });

        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].starts_with('['));
        assert!(entries[0].ends_with("] DUPLICATE SHOP IGNORED: Tony's Deli"));
        assert!(entries[1].ends_with("NEW SHOP ADDED: Mario's Subs (by community)"));
    }

    #[test]
    fn existing_log_is_never_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.log");
        std::fs::write(&path, "[2024-01-01 00:00:00] OLD ENTRY\n").unwrap();

        let log = ActivityLog::new(path);
        log.record(ActivityEvent::ImagesExhausted);

        let entries = log.entries().unwrap();
        assert_eq!(entries[0], "[2024-01-01 00:00:00] OLD ENTRY");
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn timestamps_never_go_backwards() {
        let log = ActivityLog::new(PathBuf::from("unused.log"));
        let later = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let earlier = later - Duration::seconds(30);

        let first = log.next_timestamp(later);
        let second = log.next_timestamp(earlier);
        assert_eq!(first, second);
        assert!(log.next_timestamp(later + Duration::seconds(1)) > second);
    }

    #[test]
    fn multiline_messages_stay_on_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let log = ActivityLog::new(dir.path().join("activity.log"));
        log.record(ActivityEvent::CandidateExtracted {
            comment_id: "c1".to_string(),
            name: "Tony's\nDeli".to_string(),
        });
        assert_eq!(log.entries().unwrap().len(), 1);
    }
}
