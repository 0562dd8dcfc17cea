//! Raw post → [`Article`] normalization.
//!
//! This is the single place where source field shapes are inspected. Everything
//! downstream sees only canonical articles.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use folio_shared::{Article, Tags};

use crate::source::{RawContent, RawCoverImage, RawPost};

/// Normalize one raw post. Returns `None` for records missing `id`, `slug`
/// or `title`.
pub fn normalize_post(raw: RawPost) -> Option<Article> {
    let Some(id) = required(raw.id) else {
        warn!(slug = ?raw.slug, "dropping post without id");
        return None;
    };
    let Some(slug) = required(raw.slug) else {
        warn!(%id, "dropping post without slug");
        return None;
    };
    let Some(title) = required(raw.title) else {
        warn!(%id, %slug, "dropping post without title");
        return None;
    };

    Some(Article {
        published_at: raw.published_at.as_deref().and_then(parse_published_at),
        content: raw.content.and_then(RawContent::into_html),
        cover_image: raw
            .cover_image
            .and_then(RawCoverImage::first_url)
            .filter(|url| !url.trim().is_empty()),
        tags: Tags::from(raw.tags),
        excerpt: raw.excerpt.unwrap_or_default(),
        category: raw.category.unwrap_or_default(),
        id,
        slug,
        title,
    })
}

/// Normalize a batch, keeping source order and the first record per slug.
pub fn normalize_posts(raw: Vec<RawPost>) -> Vec<Article> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(normalize_post)
        .filter(|article| {
            let fresh = seen.insert(article.slug.clone());
            if !fresh {
                warn!(slug = %article.slug, id = %article.id, "dropping duplicate slug");
            }
            fresh
        })
        .collect()
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    if let Some(at) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Some(at.and_utc());
    }
    debug!(value = raw, "unparseable publishedAt, leaving empty");
    None
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_shared::RawTags;

    fn raw(id: &str, slug: &str, title: &str) -> RawPost {
        RawPost {
            id: Some(id.into()),
            slug: Some(slug.into()),
            title: Some(title.into()),
            ..RawPost::default()
        }
    }

    #[test]
    fn fills_defaults_for_missing_optionals() {
        let article = normalize_post(raw("1", "hello", "Hello")).expect("valid");
        assert_eq!(article.excerpt, "");
        assert_eq!(article.category, "");
        assert!(article.tags.is_empty());
        assert!(article.published_at.is_none());
        assert!(article.cover_image.is_none());
        assert!(article.content.is_none());
    }

    #[test]
    fn drops_records_missing_required_fields() {
        assert!(normalize_post(RawPost { id: None, ..raw("1", "a", "A") }).is_none());
        assert!(normalize_post(raw("1", "  ", "A")).is_none());
        assert!(normalize_post(raw("1", "a", "")).is_none());
    }

    #[test]
    fn tag_shapes_normalize_identically() {
        let mut from_string = raw("1", "a", "A");
        from_string.tags = Some(RawTags::Delimited("a,b,,c".into()));
        let mut from_list = raw("2", "b", "B");
        from_list.tags = Some(RawTags::List(vec!["a".into(), "b".into(), "c".into()]));

        let a = normalize_post(from_string).unwrap();
        let b = normalize_post(from_list).unwrap();
        assert_eq!(a.tags, b.tags);
        assert_eq!(a.tags.as_slice(), ["a", "b", "c"]);
    }

    #[test]
    fn parses_published_at_variants() {
        assert_eq!(
            parse_published_at("2026-10-01T12:00:00+02:00").map(|d| d.to_rfc3339()),
            Some("2026-10-01T10:00:00+00:00".into())
        );
        assert!(parse_published_at("2026-10-01").is_some());
        assert!(parse_published_at("last tuesday").is_none());
    }

    #[test]
    fn duplicate_slugs_keep_first() {
        let articles = normalize_posts(vec![
            raw("1", "same", "First"),
            raw("2", "other", "Other"),
            raw("3", "same", "Second"),
        ]);
        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["First", "Other"]);
    }

    #[test]
    fn blank_cover_url_is_absent() {
        let mut post = raw("1", "a", "A");
        post.cover_image = serde_json::from_str(r#"[{"url": ""}]"#).ok();
        let article = normalize_post(post).unwrap();
        assert!(article.cover_image.is_none());
    }
}
