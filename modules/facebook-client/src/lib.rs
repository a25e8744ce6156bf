pub mod error;
pub mod types;

pub use error::{FacebookError, Result};
pub use types::{Comment, CommentAuthor, PageInfo, COMMENT_FIELDS, MAX_COMMENT_PAGE};

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use types::{describe_error_body, FeedResponse, Paged, PhotoResponse};

const BASE_URL: &str = "https://graph.facebook.com/v18.0";

pub struct FacebookClient {
    client: reqwest::Client,
    token: String,
    page_id: String,
    base_url: String,
}

impl FacebookClient {
    pub fn new(token: String, page_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            page_id,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    /// Fetch page metadata. Used once at startup to prove the token works.
    pub async fn page_info(&self) -> Result<PageInfo> {
        let url = format!("{}/{}", self.base_url, self.page_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("fields", "id,name")])
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        Ok(resp.json().await?)
    }

    /// Fetch a single page of comments on a post, capped at `MAX_COMMENT_PAGE`.
    pub async fn comments(&self, post_id: &str, limit: u32) -> Result<Vec<Comment>> {
        let limit = limit.min(MAX_COMMENT_PAGE).to_string();
        let url = format!("{}/{}/comments", self.base_url, post_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("fields", COMMENT_FIELDS), ("limit", limit.as_str())])
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let page: Paged<Comment> = resp.json().await?;
        tracing::debug!(post_id, count = page.data.len(), "Fetched comments");
        Ok(page.data)
    }

    /// Publish a text-only post to the page feed. Returns the new post id.
    pub async fn post_message(&self, message: &str) -> Result<String> {
        let url = format!("{}/{}/feed", self.base_url, self.page_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .form(&[("message", message)])
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let created: FeedResponse = resp.json().await?;
        tracing::info!(post_id = %created.id, "Published feed post");
        Ok(created.id)
    }

    /// Publish a photo with a caption. Returns the feed post id so comments
    /// can be read back later.
    pub async fn post_photo(&self, message: &str, image: Bytes) -> Result<String> {
        let url = format!("{}/{}/photos", self.base_url, self.page_id);
        let part = Part::bytes(image.to_vec())
            .file_name("image.png")
            .mime_str("image/png")?;
        let form = Form::new()
            .text("message", message.to_string())
            .part("source", part);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let created: PhotoResponse = resp.json().await?;
        let post_id = created.feed_post_id().ok_or(FacebookError::MissingPostId)?;
        tracing::info!(post_id = %post_id, "Published photo post");
        Ok(post_id)
    }
}

async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(FacebookError::Api {
        status: status.as_u16(),
        message: describe_error_body(&body),
    })
}
