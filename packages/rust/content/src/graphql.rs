//! GraphQL-over-HTTP implementation of [`PostSource`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

use folio_shared::{ContentConfig, FolioError, Result};

use crate::source::{PostSource, RawPost};

/// User-Agent string for content API requests.
const USER_AGENT: &str = concat!("Folio/", env!("CARGO_PKG_VERSION"));

/// Maximum response size we accept (10 MB).
const MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

const LIST_POSTS_QUERY: &str = r#"
query GetAllPosts {
  posts(orderBy: publishedAt_DESC) {
    id
    title
    slug
    excerpt
    publishedAt
    category
    tags
    coverImage {
      url
    }
  }
}
"#;

const POST_BY_SLUG_QUERY: &str = r#"
query GetPostBySlug($slug: String!) {
  posts(where: { slug: $slug }) {
    id
    title
    slug
    excerpt
    content {
      html
    }
    publishedAt
    category
    tags
    coverImage {
      url
    }
  }
}
"#;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<PostsData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct PostsData {
    #[serde(default)]
    posts: Option<Vec<RawPost>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

// ---------------------------------------------------------------------------
// GraphQlSource
// ---------------------------------------------------------------------------

/// Posts fetched from a GraphQL content endpoint.
pub struct GraphQlSource {
    client: Client,
    endpoint: Url,
    token: Option<String>,
}

impl GraphQlSource {
    /// Build a source for the configured endpoint.
    pub fn new(config: &ContentConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FolioError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
        })
    }

    /// POST one query and return its `posts` field.
    async fn query_posts(&self, query: &str, variables: serde_json::Value) -> Result<Vec<RawPost>> {
        let endpoint = &self.endpoint;
        let mut request = self
            .client
            .post(endpoint.as_str())
            .json(&GraphQlRequest { query, variables });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FolioError::Network(format!("{endpoint}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FolioError::Network(format!("{endpoint}: HTTP {status}")));
        }

        if let Some(len) = response.content_length() {
            if len > MAX_RESPONSE_SIZE {
                return Err(FolioError::decode(format!(
                    "{endpoint}: response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"
                )));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| FolioError::Network(format!("{endpoint}: failed to read body: {e}")))?;

        let parsed: GraphQlResponse = serde_json::from_str(&body)
            .map_err(|e| FolioError::decode(format!("{endpoint}: {e}")))?;

        if !parsed.errors.is_empty() {
            let messages: Vec<&str> = parsed.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(FolioError::Query(messages.join("; ")));
        }

        let posts = parsed.data.and_then(|d| d.posts).unwrap_or_default();
        debug!(count = posts.len(), "query returned posts");
        Ok(posts)
    }
}

#[async_trait]
impl PostSource for GraphQlSource {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn list_posts(&self) -> Result<Vec<RawPost>> {
        self.query_posts(LIST_POSTS_QUERY, json!({})).await
    }

    #[instrument(skip_all, fields(endpoint = %self.endpoint, slug = %slug))]
    async fn posts_by_slug(&self, slug: &str) -> Result<Vec<RawPost>> {
        self.query_posts(POST_BY_SLUG_QUERY, json!({ "slug": slug }))
            .await
    }

    fn name(&self) -> &str {
        "graphql"
    }
}
