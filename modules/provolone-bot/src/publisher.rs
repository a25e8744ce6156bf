use std::path::PathBuf;

use anyhow::{Context, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{error, info};

use facebook_client::FacebookError;
use provolone_common::ProvoloneError;

use crate::context::BotContext;
use crate::infra::activity_log::ActivityEvent;
use crate::infra::util::{file_timestamp, preview};
use crate::traits::SocialPlatform;

/// Characters of the message kept in the activity log.
const LOG_PREVIEW_CHARS: usize = 50;

pub struct Publisher<'a> {
    platform: &'a dyn SocialPlatform,
    ctx: &'a BotContext,
}

impl<'a> Publisher<'a> {
    pub fn new(platform: &'a dyn SocialPlatform, ctx: &'a BotContext) -> Self {
        Self { platform, ctx }
    }

    /// Publish once. With an image the photo endpoint is used, otherwise the
    /// plain feed endpoint. There is no retry.
    pub async fn publish(&self, text: &str, image: Option<Bytes>) -> Result<String, ProvoloneError> {
        let result = match image {
            Some(image) => self.platform.post_photo(text, image).await,
            None => self.platform.post_message(text).await,
        };

        match result {
            Ok(post_id) => {
                info!(post_id = %post_id, "Posted to page");
                self.ctx.record(ActivityEvent::PostCreated {
                    post_id: post_id.clone(),
                    preview: preview(text, LOG_PREVIEW_CHARS).to_string(),
                });
                Ok(post_id)
            }
            Err(e) => {
                error!(error = %e, "Failed to post");
                self.ctx.record(ActivityEvent::PostFailed {
                    reason: e.to_string(),
                });
                Err(into_publish_error(e))
            }
        }
    }
}

fn into_publish_error(err: FacebookError) -> ProvoloneError {
    match err {
        FacebookError::Network(msg) => ProvoloneError::Transport(msg),
        FacebookError::Api { status, message } => ProvoloneError::PublishFailure {
            status: Some(status),
            body: message,
        },
        other => ProvoloneError::PublishFailure {
            status: None,
            body: other.to_string(),
        },
    }
}

/// Write an unpublished message to `saved_posts/` for manual recovery.
pub fn save_failed_post(ctx: &BotContext, text: &str, now: DateTime<Utc>) -> Result<PathBuf> {
    let dir = ctx.paths.saved_posts_dir();
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(format!("failed_post_{}.txt", file_timestamp(now)));
    let contents = format!("{text}\nTimestamp: {}\n", now.to_rfc3339());
    std::fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    ctx.record(ActivityEvent::PostSaved { path: path.clone() });
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn image_uses_photo_endpoint() {
        let (_dir, ctx) = test_context();
        let platform = MockPlatform::new();

        let post_id = Publisher::new(&platform, &ctx)
            .publish("🥪 Lunch", Some(Bytes::from_static(b"png")))
            .await
            .unwrap();

        let published = platform.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].post_id, post_id);
        assert!(published[0].with_image);
    }

    #[tokio::test]
    async fn text_only_uses_feed_endpoint() {
        let (_dir, ctx) = test_context();
        let platform = MockPlatform::new();

        Publisher::new(&platform, &ctx).publish("🥪 Lunch", None).await.unwrap();

        let published = platform.published();
        assert!(!published[0].with_image);
        assert_eq!(published[0].message, "🥪 Lunch");
        let log = ctx.activity.entries().unwrap();
        assert!(log[0].contains("POST CREATED: "));
    }

    #[tokio::test]
    async fn rejection_carries_status_and_body() {
        let (_dir, ctx) = test_context();
        let platform = MockPlatform::new().fail_posts();

        let err = Publisher::new(&platform, &ctx).publish("🥪 Lunch", None).await.unwrap_err();

        match err {
            ProvoloneError::PublishFailure { status, body } => {
                assert_eq!(status, Some(500));
                assert!(body.contains("mock outage"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(platform.published().is_empty());
    }

    #[test]
    fn failed_post_is_saved_with_timestamp() {
        let (_dir, ctx) = test_context();
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();

        let path = save_failed_post(&ctx, "🦃 Today's special", now).unwrap();

        assert!(path.ends_with("failed_post_20250301_123000.txt"));
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            contents,
            "🦃 Today's special\nTimestamp: 2025-03-01T12:30:00+00:00\n"
        );
    }
}
