//! Explicit run context: where every persisted file lives, plus the activity
//! log sink. Built once in `main` (or per test in a temp dir) and borrowed by
//! every component, so nothing depends on the working directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::infra::activity_log::{ActivityEvent, ActivityLog};

#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Community and user venues (admin seeds are never written here).
    pub fn venues_file(&self) -> PathBuf {
        self.root.join("sandwich_shops.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn recent_posts_file(&self) -> PathBuf {
        self.logs_dir().join("recent_posts.json")
    }

    pub fn activity_log_file(&self) -> PathBuf {
        self.logs_dir().join("sandwich_shop_activity.log")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    pub fn saved_posts_dir(&self) -> PathBuf {
        self.root.join("saved_posts")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join("generated_images")
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            self.root.clone(),
            self.logs_dir(),
            self.reports_dir(),
            self.saved_posts_dir(),
            self.images_dir(),
        ] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        Ok(())
    }
}

pub struct BotContext {
    pub paths: DataPaths,
    pub activity: ActivityLog,
}

impl BotContext {
    /// Create the data directory layout and open the activity log.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let paths = DataPaths::new(root);
        paths.ensure_dirs()?;
        let activity = ActivityLog::new(paths.activity_log_file());
        Ok(Self { paths, activity })
    }

    pub fn record(&self, event: ActivityEvent) {
        self.activity.record(event);
    }
}
