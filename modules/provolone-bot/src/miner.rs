//! Comment mining: turn popular replies on our own posts into pending venues.

use chrono::Utc;
use tracing::{info, warn};

use facebook_client::Comment;
use provolone_common::VenueRecord;

use crate::context::BotContext;
use crate::heuristics::{NameRules, RecommendationRules};
use crate::infra::activity_log::ActivityEvent;
use crate::store::VenueStore;
use crate::traits::SocialPlatform;

/// Comments need this many likes before the community "vote" counts.
pub const LIKE_THRESHOLD: u32 = 5;

/// One page of comments per post.
pub const COMMENT_PAGE_SIZE: u32 = 100;

/// Comments at or above `threshold` likes, in platform order.
fn popular(comments: &[Comment], threshold: u32) -> impl Iterator<Item = &Comment> {
    comments.iter().filter(move |c| c.like_count >= threshold)
}

pub struct CommentMiner<'a> {
    platform: &'a dyn SocialPlatform,
    ctx: &'a BotContext,
    recommendation: RecommendationRules,
    names: NameRules,
}

impl<'a> CommentMiner<'a> {
    pub fn new(platform: &'a dyn SocialPlatform, ctx: &'a BotContext) -> Self {
        Self {
            platform,
            ctx,
            recommendation: RecommendationRules::default(),
            names: NameRules::default(),
        }
    }

    pub fn with_rules(mut self, recommendation: RecommendationRules, names: NameRules) -> Self {
        self.recommendation = recommendation;
        self.names = names;
        self
    }

    /// Mine one post. Returns the venues accepted into `store`.
    ///
    /// A failed comment fetch is logged and yields no venues; it never
    /// propagates.
    pub async fn mine(&self, post_id: &str, store: &mut VenueStore) -> Vec<VenueRecord> {
        let comments = match self.platform.comments(post_id, COMMENT_PAGE_SIZE).await {
            Ok(comments) => comments,
            Err(e) => {
                warn!(post_id, error = %e, "Comment fetch failed");
                self.ctx.record(ActivityEvent::CommentCheckFailed {
                    post_id: post_id.to_string(),
                    error: e.to_string(),
                });
                return Vec::new();
            }
        };
        self.mine_comments(post_id, &comments, LIKE_THRESHOLD, store)
    }

    fn mine_comments(
        &self,
        post_id: &str,
        comments: &[Comment],
        threshold: u32,
        store: &mut VenueStore,
    ) -> Vec<VenueRecord> {
        let qualifying: Vec<&Comment> = popular(comments, threshold).collect();
        self.ctx.record(ActivityEvent::CheckingComments {
            post_id: post_id.to_string(),
            found: comments.len(),
            qualifying: qualifying.len(),
        });

        let mut accepted = Vec::new();
        for comment in qualifying {
            if let Some(record) = self.consider(comment, store) {
                accepted.push(record);
            }
        }

        info!(post_id, accepted = accepted.len(), "Mined post comments");
        accepted
    }

    fn consider(&self, comment: &Comment, store: &mut VenueStore) -> Option<VenueRecord> {
        let text = comment.message.trim();

        if !self.recommendation.looks_like_recommendation(text) {
            self.ctx.record(ActivityEvent::NotRecommendation {
                comment_id: comment.id.clone(),
            });
            return None;
        }

        let Some(name) = self.names.extract_name(text) else {
            self.ctx.record(ActivityEvent::NoNameFound {
                comment_id: comment.id.clone(),
            });
            return None;
        };
        self.ctx.record(ActivityEvent::CandidateExtracted {
            comment_id: comment.id.clone(),
            name: name.clone(),
        });

        let record = VenueRecord::from_comment(
            name.clone(),
            comment.id.clone(),
            comment.like_count,
            Utc::now().date_naive(),
        );
        if !store.submit(record.clone(), self.ctx) {
            return None;
        }

        self.ctx.record(ActivityEvent::CommunityShopAdded {
            name,
            likes: comment.like_count,
        });
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use provolone_common::{AddedBy, VenueStatus};

    #[tokio::test]
    async fn popular_recommendation_is_accepted_as_pending_community_venue() {
        let (_dir, ctx) = test_context();
        let platform = MockPlatform::new().on_comments(
            "post_1",
            vec![comment("c1", "Try Mario's Subs on Main Street", 8)],
        );
        let mut store = VenueStore::seeded();

        let accepted = CommentMiner::new(&platform, &ctx).mine("post_1", &mut store).await;

        assert_eq!(accepted.len(), 1);
        let record = &accepted[0];
        assert_eq!(record.name, "Mario's Subs");
        assert_eq!(record.added_by, AddedBy::Community);
        assert_eq!(record.status, VenueStatus::Pending);
        assert_eq!(record.source_comment_id.as_deref(), Some("c1"));
        assert_eq!(record.likes_at_acceptance, Some(8));
        assert!(store.contains("mario's subs"));
    }

    #[tokio::test]
    async fn comments_below_threshold_are_never_examined() {
        let (_dir, ctx) = test_context();
        let platform = MockPlatform::new().on_comments(
            "post_1",
            vec![
                comment("c1", "Mario's Subs", 4),
                comment("c2", "Pastrami Palace", 0),
            ],
        );
        let mut store = VenueStore::seeded();

        let accepted = CommentMiner::new(&platform, &ctx).mine("post_1", &mut store).await;

        assert!(accepted.is_empty());
        assert_eq!(store.len(), 2);
        let log = ctx.activity.entries().unwrap();
        assert_eq!(log.len(), 1);
        assert!(log[0].contains("Found 2 comments on post post_1 (0 with enough likes)"));
    }

    #[tokio::test]
    async fn duplicate_of_seed_is_a_logged_noop() {
        let (_dir, ctx) = test_context();
        let platform = MockPlatform::new()
            .on_comments("post_1", vec![comment("c1", "TONY'S DELI", 20)]);
        let mut store = VenueStore::seeded();

        let accepted = CommentMiner::new(&platform, &ctx).mine("post_1", &mut store).await;

        assert!(accepted.is_empty());
        assert_eq!(store.len(), 2);
        let log = ctx.activity.entries().unwrap();
        assert!(log.iter().any(|l| l.ends_with("DUPLICATE SHOP IGNORED: TONY'S DELI")));
    }

    #[tokio::test]
    async fn unrecognised_and_nameless_comments_are_logged() {
        let (_dir, ctx) = test_context();
        let platform = MockPlatform::new().on_comments(
            "post_1",
            vec![
                comment(
                    "c1",
                    "my family has been going there for years and we never get tired of it",
                    30,
                ),
                comment(
                    "c2",
                    "the sandwich place near my office does a great version of this every friday",
                    30,
                ),
            ],
        );
        let mut store = VenueStore::seeded();

        let accepted = CommentMiner::new(&platform, &ctx).mine("post_1", &mut store).await;

        assert!(accepted.is_empty());
        let log = ctx.activity.entries().unwrap();
        assert!(log.iter().any(|l| l.ends_with("COMMENT SKIPPED: c1 does not look like a recommendation")));
        assert!(log.iter().any(|l| l.ends_with("NO SHOP NAME FOUND: comment c2")));
    }

    #[tokio::test]
    async fn fetch_failure_is_absorbed() {
        let (_dir, ctx) = test_context();
        let platform = MockPlatform::new().fail_comments("post_1");
        let mut store = VenueStore::seeded();

        let accepted = CommentMiner::new(&platform, &ctx).mine("post_1", &mut store).await;

        assert!(accepted.is_empty());
        let log = ctx.activity.entries().unwrap();
        assert!(log[0].contains("ERROR CHECKING COMMENTS: post post_1"));
    }

    #[test]
    fn raising_the_threshold_only_shrinks_the_accepted_set() {
        let comments = vec![
            comment("c1", "Mario's Subs", 5),
            comment("c2", "Pastrami Palace", 9),
            comment("c3", "Sal's Hoagies", 15),
            comment("c4", "Bread Box", 2),
        ];

        let mut previous: Option<Vec<String>> = None;
        for threshold in [0, 5, 6, 10, 16] {
            let (_dir, ctx) = test_context();
            let platform = MockPlatform::new();
            let miner = CommentMiner::new(&platform, &ctx);
            let mut store = VenueStore::new();

            let names: Vec<String> = miner
                .mine_comments("post_1", &comments, threshold, &mut store)
                .into_iter()
                .map(|r| r.name)
                .collect();

            if let Some(prev) = &previous {
                assert!(names.iter().all(|n| prev.contains(n)), "{names:?} ⊄ {prev:?}");
            }
            previous = Some(names);
        }
    }

    #[test]
    fn fixed_threshold_is_five() {
        let comments = vec![comment("c1", "x", 4), comment("c2", "y", 5)];
        let ids: Vec<&str> = popular(&comments, LIKE_THRESHOLD).map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c2"]);
    }
}
