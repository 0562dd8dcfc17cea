//! Canonical article model and tag normalization.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Cover image reference used when an article has none.
pub const PLACEHOLDER_COVER: &str = "/placeholder.svg?height=400&width=800";

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Tags as the content source may supply them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawTags {
    /// Native list, e.g. `["rust", "cli"]`.
    List(Vec<TagEntry>),
    /// Comma-delimited string, e.g. `"rust,cli"`.
    Delimited(String),
}

/// One element of a list-shaped tags value.
///
/// Non-string elements (numbers, objects, `null`) decode as `None` so the
/// string entries next to them survive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "TagEntryRepr")]
pub struct TagEntry(pub Option<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum TagEntryRepr {
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl From<TagEntryRepr> for TagEntry {
    fn from(repr: TagEntryRepr) -> Self {
        match repr {
            TagEntryRepr::Text(text) => Self(Some(text)),
            TagEntryRepr::Other(_) => Self(None),
        }
    }
}

impl From<&str> for TagEntry {
    fn from(text: &str) -> Self {
        Self(Some(text.to_string()))
    }
}

/// Normalized, ordered set of non-empty tag strings.
///
/// Both source shapes converge here: segments are trimmed, empty ones dropped,
/// and duplicates removed keeping the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Tags {
    /// Build from a list of raw entries.
    pub fn from_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let tags = items
            .into_iter()
            .filter_map(|item| {
                let trimmed = item.as_ref().trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .filter(|tag| seen.insert(tag.clone()))
            .collect();
        Self(tags)
    }

    /// Build from a comma-delimited string.
    pub fn from_delimited(raw: &str) -> Self {
        Self::from_list(raw.split(','))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<RawTags> for Tags {
    fn from(raw: RawTags) -> Self {
        match raw {
            RawTags::List(items) => Self::from_list(items.into_iter().filter_map(|entry| entry.0)),
            RawTags::Delimited(s) => Self::from_delimited(&s),
        }
    }
}

impl From<Option<RawTags>> for Tags {
    fn from(raw: Option<RawTags>) -> Self {
        raw.map(Self::from).unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<RawTags>::deserialize(deserializer).map(Self::from)
    }
}

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// A normalized article record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Opaque identifier, stable across fetches.
    pub id: String,
    /// Display title (non-empty).
    pub title: String,
    /// URL-safe identifier, unique within a snapshot.
    pub slug: String,
    /// Short summary; may be empty.
    #[serde(default)]
    pub excerpt: String,
    /// HTML body. Only present on detail fetches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Tags,
    /// URL of the first cover image descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl Article {
    /// Cover image URL, or [`PLACEHOLDER_COVER`] when the article has none.
    pub fn cover_image_url(&self) -> &str {
        self.cover_image.as_deref().unwrap_or(PLACEHOLDER_COVER)
    }

    /// Publication date as `October 19, 2026`, or empty when unknown.
    pub fn published_display(&self) -> String {
        self.published_at
            .map(|at| at.format("%B %-d, %Y").to_string())
            .unwrap_or_default()
    }
}
