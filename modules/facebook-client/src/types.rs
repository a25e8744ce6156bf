use serde::{Deserialize, Serialize};

/// Fields requested for every comment read.
pub const COMMENT_FIELDS: &str = "id,message,like_count,created_time,from";

/// Graph API caps comment pages at this size.
pub const MAX_COMMENT_PAGE: u32 = 100;

/// Basic page metadata, used to verify the token at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct PageInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A single comment on a page post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub like_count: u32,
    /// Graph timestamps use `+0000` offsets, which are not RFC 3339; kept raw.
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub from: Option<CommentAuthor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Cursor-paged collection wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Paged<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<String>,
}

/// Response from `POST /{page_id}/feed`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedResponse {
    pub id: String,
}

/// Response from `POST /{page_id}/photos`. `post_id` is the feed story that
/// carries comments; `id` is the photo object itself.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoResponse {
    pub id: Option<String>,
    pub post_id: Option<String>,
}

impl PhotoResponse {
    pub fn feed_post_id(self) -> Option<String> {
        self.post_id.or(self.id)
    }
}

/// Graph error envelope: `{"error": {"message": ..., "code": ...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: GraphError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphError {
    pub message: String,
    #[serde(default)]
    pub code: Option<i64>,
}

/// Prefer the Graph error message over the raw body when the body parses.
pub fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.code {
            Some(code) => format!("{} (code {})", envelope.error.message, code),
            None => envelope.error.message,
        },
        Err(_) => body.to_string(),
    }
}
