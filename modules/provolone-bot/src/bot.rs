//! Run orchestration: mine earlier posts, publish a new one, track it, report.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};

use provolone_common::{AddedBy, ProvoloneError, TrackedPost, VenueRecord};

use crate::content::ContentGenerator;
use crate::context::BotContext;
use crate::generation::ImageGenerator;
use crate::infra::activity_log::ActivityEvent;
use crate::miner::CommentMiner;
use crate::publisher::{save_failed_post, Publisher};
use crate::report::generate_report;
use crate::scheduling::{Schedule, Task, Ticker};
use crate::store::{TrackedPosts, VenueStore};
use crate::traits::SocialPlatform;

/// What a single cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub posts_examined: usize,
    pub venues_accepted: usize,
    pub published: Option<String>,
    pub report: Option<PathBuf>,
}

pub struct Bot {
    ctx: BotContext,
    platform: Arc<dyn SocialPlatform>,
    images: ImageGenerator,
    content: ContentGenerator,
    store: VenueStore,
    rng: StdRng,
    custom_message: Option<String>,
    generate_images: bool,
}

impl Bot {
    /// Seeds the venue list, then merges whatever was persisted. A corrupt
    /// venue file is logged and the bot starts from the seeds alone.
    pub fn new(ctx: BotContext, platform: Arc<dyn SocialPlatform>, images: ImageGenerator) -> Self {
        let mut store = VenueStore::seeded();
        let venues_file = ctx.paths.venues_file();
        if let Err(e) = store.load_merge(&venues_file) {
            warn!(error = %e, path = %venues_file.display(), "Could not load venues, using seeds only");
        }
        info!(venues = store.len(), providers = ?images.provider_names(), "Bot initialised");

        Self {
            ctx,
            platform,
            images,
            content: ContentGenerator::new(),
            store,
            rng: StdRng::from_os_rng(),
            custom_message: None,
            generate_images: true,
        }
    }

    /// Publish this text instead of generated copy.
    pub fn with_custom_message(mut self, message: Option<String>) -> Self {
        self.custom_message = message;
        self
    }

    pub fn with_images(mut self, enabled: bool) -> Self {
        self.generate_images = enabled;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn context(&self) -> &BotContext {
        &self.ctx
    }

    pub fn store(&self) -> &VenueStore {
        &self.store
    }

    /// Mine every tracked post not yet examined, oldest first. Each post is
    /// flagged examined after its pass, whatever the pass found, and is never
    /// mined again. Returns (posts examined, venues accepted).
    pub async fn check_recent_posts(&mut self) -> (usize, usize) {
        let posts_file = self.ctx.paths.recent_posts_file();
        let mut tracked = match TrackedPosts::load(&posts_file) {
            Ok(tracked) => tracked,
            Err(e) => {
                error!(error = %e, "Failed to read tracked posts");
                self.ctx.record(ActivityEvent::RecentPostsFailed {
                    error: format!("{e:#}"),
                });
                return (0, 0);
            }
        };

        let pending = tracked.unexamined();
        if pending.is_empty() {
            info!("No tracked posts awaiting a comment check");
            return (0, 0);
        }

        let miner = CommentMiner::new(self.platform.as_ref(), &self.ctx);
        let mut accepted = 0;
        for post_id in &pending {
            accepted += miner.mine(post_id, &mut self.store).await.len();
            tracked.mark_examined(post_id);
        }

        if let Err(e) = tracked.save(&posts_file) {
            error!(error = %e, "Failed to save tracked posts");
            self.ctx.record(ActivityEvent::RecentPostsFailed {
                error: format!("{e:#}"),
            });
        }
        (pending.len(), accepted)
    }

    /// Draft, illustrate and publish one post. A published post is tracked
    /// for later mining; a rejected one is written to `saved_posts/`.
    pub async fn create_and_post(&mut self) -> Result<String, ProvoloneError> {
        let draft = self.content.draft(&mut self.rng, &self.store);
        let message = self
            .custom_message
            .clone()
            .unwrap_or_else(|| draft.message());

        let image = if self.generate_images {
            self.images.generate(&draft.image_prompt(), &self.ctx).await
        } else {
            None
        };

        let publisher = Publisher::new(self.platform.as_ref(), &self.ctx);
        match publisher.publish(&message, image).await {
            Ok(post_id) => {
                self.track(&post_id);
                Ok(post_id)
            }
            Err(e) => {
                if let Err(save_err) = save_failed_post(&self.ctx, &message, Utc::now()) {
                    error!(error = %save_err, "Failed to save post for recovery");
                }
                Err(e)
            }
        }
    }

    fn track(&self, post_id: &str) {
        let posts_file = self.ctx.paths.recent_posts_file();
        let mut tracked = TrackedPosts::load(&posts_file).unwrap_or_else(|e| {
            warn!(error = %e, "Tracked posts unreadable, starting a new history");
            TrackedPosts::new()
        });
        tracked.track(TrackedPost::new(post_id, Utc::now()));
        if let Err(e) = tracked.save(&posts_file) {
            error!(error = %e, post_id, "Failed to save tracked posts");
            self.ctx.record(ActivityEvent::RecentPostsFailed {
                error: format!("{e:#}"),
            });
        }
    }

    /// Write a report. Failure is logged, never propagated.
    pub fn report(&self) -> Option<PathBuf> {
        match generate_report(&self.ctx, &self.store, Utc::now()) {
            Ok(path) => Some(path),
            Err(e) => {
                error!(error = %e, "Failed to generate report");
                self.ctx.record(ActivityEvent::ReportFailed {
                    error: format!("{e:#}"),
                });
                None
            }
        }
    }

    /// One full cycle. Mining and publishing failures are absorbed; the report
    /// step is always reached.
    pub async fn run_once(&mut self) -> RunSummary {
        info!("Starting cycle");
        let (posts_examined, venues_accepted) = self.check_recent_posts().await;
        let published = self.create_and_post().await.ok();
        let report = self.report();

        let summary = RunSummary {
            posts_examined,
            venues_accepted,
            published,
            report,
        };
        info!(
            posts_examined = summary.posts_examined,
            venues_accepted = summary.venues_accepted,
            published = summary.published.is_some(),
            "Cycle complete"
        );
        summary
    }

    /// One full cycle immediately, then each task on its own interval until
    /// Ctrl-C.
    pub async fn run_scheduled(&mut self, schedule: Schedule) {
        self.run_once().await;

        let mut ticker = Ticker::new(&schedule);
        info!(?schedule, "Scheduled mode running");
        loop {
            tokio::select! {
                task = ticker.next() => match task {
                    Task::Post => {
                        let _ = self.create_and_post().await;
                    }
                    Task::CheckComments => {
                        self.check_recent_posts().await;
                    }
                    Task::Report => {
                        self.report();
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }
    }

    /// Add a venue submitted directly by a user. It starts out pending.
    pub fn add_venue(&mut self, name: &str, location: &str, specialty: &str) -> bool {
        let record = VenueRecord::new(
            name.trim(),
            location.trim(),
            specialty.trim(),
            AddedBy::User,
            Utc::now().date_naive(),
        );
        self.store.submit(record, &self.ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use provolone_common::VenueStatus;

    fn bot(ctx: BotContext, platform: Arc<MockPlatform>) -> Bot {
        Bot::new(ctx, platform, ImageGenerator::new()).with_rng(StdRng::seed_from_u64(1))
    }

    #[tokio::test]
    async fn custom_message_replaces_generated_copy() {
        let (_dir, ctx) = test_context();
        let platform = Arc::new(MockPlatform::new());
        let mut bot = bot(ctx, platform.clone())
            .with_custom_message(Some("Lunch is served".to_string()));

        bot.create_and_post().await.unwrap();

        assert_eq!(platform.published()[0].message, "Lunch is served");
    }

    #[tokio::test]
    async fn disabled_images_skip_providers() {
        let (_dir, ctx) = test_context();
        let platform = Arc::new(MockPlatform::new());
        let provider = StaticProvider::new("static", b"png");
        let calls = provider.calls();
        let images = ImageGenerator::new().with_provider(provider);
        let mut bot = Bot::new(ctx, platform.clone(), images).with_images(false);

        bot.create_and_post().await.unwrap();

        assert_eq!(calls.get(), 0);
        assert!(!platform.published()[0].with_image);
    }

    #[tokio::test]
    async fn published_post_is_tracked_unexamined() {
        let (_dir, ctx) = test_context();
        let platform = Arc::new(MockPlatform::new());
        let mut bot = bot(ctx, platform);

        let post_id = bot.create_and_post().await.unwrap();

        let tracked = TrackedPosts::load(&bot.context().paths.recent_posts_file()).unwrap();
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked.posts()[0].post_id, post_id);
        assert!(!tracked.posts()[0].examined);
    }

    #[tokio::test]
    async fn user_venue_is_pending_and_persisted() {
        let (_dir, ctx) = test_context();
        let mut bot = bot(ctx, Arc::new(MockPlatform::new()));

        assert!(bot.add_venue(" Bread Box ", "Elm Street", "Turkey club"));
        assert!(!bot.add_venue("bread box", "Elsewhere", "Anything"));

        let record = bot.store().records().last().unwrap().clone();
        assert_eq!(record.name, "Bread Box");
        assert_eq!(record.added_by, AddedBy::User);
        assert_eq!(record.status, VenueStatus::Pending);

        let mut reloaded = VenueStore::new();
        reloaded
            .load_merge(&bot.context().paths.venues_file())
            .unwrap();
        assert_eq!(reloaded.len(), 1);
    }

    #[tokio::test]
    async fn corrupt_tracked_posts_are_logged_and_skipped() {
        let (_dir, ctx) = test_context();
        std::fs::write(ctx.paths.recent_posts_file(), "not json").unwrap();
        let mut bot = bot(ctx, Arc::new(MockPlatform::new()));

        assert_eq!(bot.check_recent_posts().await, (0, 0));
        let log = bot.context().activity.entries().unwrap();
        assert!(log[0].contains("ERROR CHECKING RECENT POSTS"));
    }
}
