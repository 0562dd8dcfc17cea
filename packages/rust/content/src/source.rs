//! Raw post records and the query seam they come through.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use folio_shared::{RawTags, Result};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A remote source of post records.
///
/// Implementations return raw records exactly as the API shaped them, or an
/// error. Failure handling policy lives in [`ContentClient`](crate::ContentClient).
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Every post the source exposes, newest first.
    async fn list_posts(&self) -> Result<Vec<RawPost>>;

    /// Posts whose slug equals `slug`, including the full body.
    async fn posts_by_slug(&self, slug: &str) -> Result<Vec<RawPost>>;

    /// Human-readable source name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

/// A post as returned by the content API, before normalization.
///
/// Shape-sensitive fields are decoded leniently: a value of an unexpected
/// shape decodes as `None` instead of failing the whole response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPost {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<RawContent>,
    #[serde(default, deserialize_with = "lenient")]
    pub published_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub tags: Option<RawTags>,
    #[serde(default, deserialize_with = "lenient")]
    pub cover_image: Option<RawCoverImage>,
}

/// Article body: either a rich-text object or a plain HTML string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawContent {
    Html(String),
    RichText { html: Option<String> },
}

impl RawContent {
    pub fn into_html(self) -> Option<String> {
        match self {
            Self::Html(html) => Some(html),
            Self::RichText { html } => html,
        }
    }
}

/// Cover image descriptor(s). Only the first URL is ever used.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawCoverImage {
    Many(Vec<Option<RawImage>>),
    One(RawImage),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawImage {
    #[serde(default)]
    pub url: Option<String>,
}

impl RawCoverImage {
    /// URL of the first descriptor, if it has one.
    pub fn first_url(self) -> Option<String> {
        let first = match self {
            Self::Many(images) => images.into_iter().next().flatten(),
            Self::One(image) => Some(image),
        };
        first.and_then(|image| image.url)
    }
}

fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}
