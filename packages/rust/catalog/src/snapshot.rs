//! Immutable catalog snapshots and the staleness contract.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::warn;

use folio_content::ArticleList;
use folio_shared::{Article, CatalogSection};

use crate::filter::SearchQuery;

/// Default revalidation window, in seconds.
const DEFAULT_REVALIDATE_SECS: u64 = 60;

// ---------------------------------------------------------------------------
// RefreshPolicy
// ---------------------------------------------------------------------------

/// How long a fetched snapshot stays fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub revalidate_after: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            revalidate_after: Duration::from_secs(DEFAULT_REVALIDATE_SECS),
        }
    }
}

impl From<&CatalogSection> for RefreshPolicy {
    fn from(section: &CatalogSection) -> Self {
        Self {
            revalidate_after: Duration::from_secs(section.revalidate_secs),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Where a snapshot's contents came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// Provided by the caller at construction.
    Seeded,
    /// A successful fetch; may be genuinely empty.
    Loaded,
    /// The fetch failed and the snapshot is empty by policy.
    Unavailable { reason: String },
}

/// An ordered, slug-indexed set of articles. Never mutated once built.
#[derive(Debug, Clone)]
pub struct Snapshot {
    articles: Vec<Article>,
    by_slug: HashMap<String, usize>,
    origin: SnapshotOrigin,
    fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Build a snapshot, keeping the first article for each slug.
    pub fn new(articles: Vec<Article>, origin: SnapshotOrigin, fetched_at: DateTime<Utc>) -> Self {
        let mut by_slug = HashMap::with_capacity(articles.len());
        let mut kept = Vec::with_capacity(articles.len());

        for article in articles {
            if by_slug.contains_key(&article.slug) {
                warn!(slug = %article.slug, "duplicate slug in snapshot, keeping first");
                continue;
            }
            by_slug.insert(article.slug.clone(), kept.len());
            kept.push(article);
        }

        Self {
            articles: kept,
            by_slug,
            origin,
            fetched_at,
        }
    }

    /// Snapshot of a caller-provided seed.
    pub fn seeded(articles: Vec<Article>, fetched_at: DateTime<Utc>) -> Self {
        Self::new(articles, SnapshotOrigin::Seeded, fetched_at)
    }

    /// Snapshot of a fetch outcome. A failed fetch yields an empty snapshot.
    pub fn from_list(list: ArticleList, fetched_at: DateTime<Utc>) -> Self {
        match list {
            ArticleList::Loaded(articles) => Self::new(articles, SnapshotOrigin::Loaded, fetched_at),
            ArticleList::Unavailable { reason } => {
                Self::new(Vec::new(), SnapshotOrigin::Unavailable { reason }, fetched_at)
            }
        }
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn get(&self, slug: &str) -> Option<&Article> {
        self.by_slug.get(slug).map(|&i| &self.articles[i])
    }

    pub fn origin(&self) -> &SnapshotOrigin {
        &self.origin
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// True when the contents are unknown rather than known-empty.
    pub fn needs_retry(&self) -> bool {
        matches!(self.origin, SnapshotOrigin::Unavailable { .. })
    }

    /// Whether the revalidation window has elapsed at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>, policy: &RefreshPolicy) -> bool {
        if self.needs_retry() {
            return true;
        }
        now.signed_duration_since(self.fetched_at)
            .to_std()
            .is_ok_and(|age| age >= policy.revalidate_after)
    }

    /// Articles matching `query`, in snapshot order.
    pub fn filter(&self, query: &str) -> Vec<&Article> {
        SearchQuery::parse(query).apply(&self.articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use folio_shared::Tags;

    fn article(slug: &str, title: &str) -> Article {
        Article {
            id: format!("id-{slug}"),
            title: title.into(),
            slug: slug.into(),
            excerpt: String::new(),
            content: None,
            published_at: None,
            category: String::new(),
            tags: Tags::default(),
            cover_image: None,
        }
    }

    #[test]
    fn indexes_by_slug_and_drops_duplicates() {
        let snapshot = Snapshot::seeded(
            vec![article("a", "First A"), article("b", "B"), article("a", "Second A")],
            Utc::now(),
        );

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("a").map(|a| a.title.as_str()), Some("First A"));
        assert_eq!(snapshot.get("b").map(|a| a.title.as_str()), Some("B"));
        assert!(snapshot.get("c").is_none());
    }

    #[test]
    fn failed_fetch_is_empty_and_needs_retry() {
        let snapshot = Snapshot::from_list(
            ArticleList::Unavailable {
                reason: "network error: timeout".into(),
            },
            Utc::now(),
        );
        assert!(snapshot.is_empty());
        assert!(snapshot.needs_retry());
    }

    #[test]
    fn loaded_empty_does_not_need_retry() {
        let snapshot = Snapshot::from_list(ArticleList::Loaded(Vec::new()), Utc::now());
        assert!(snapshot.is_empty());
        assert!(!snapshot.needs_retry());
        assert_eq!(snapshot.origin(), &SnapshotOrigin::Loaded);
    }

    #[test]
    fn staleness_follows_revalidation_window() {
        let fetched_at = Utc::now();
        let snapshot = Snapshot::seeded(vec![article("a", "A")], fetched_at);
        let policy = RefreshPolicy::default();

        assert!(!snapshot.is_stale(fetched_at, &policy));
        assert!(!snapshot.is_stale(fetched_at + TimeDelta::seconds(59), &policy));
        assert!(snapshot.is_stale(fetched_at + TimeDelta::seconds(60), &policy));
        // Clock skew backwards never counts as stale.
        assert!(!snapshot.is_stale(fetched_at - TimeDelta::seconds(5), &policy));
    }

    #[test]
    fn unavailable_is_always_stale() {
        let now = Utc::now();
        let snapshot = Snapshot::from_list(ArticleList::Unavailable { reason: "x".into() }, now);
        assert!(snapshot.is_stale(now, &RefreshPolicy::default()));
    }

    #[test]
    fn policy_from_config_section() {
        let policy = RefreshPolicy::from(&CatalogSection { revalidate_secs: 5 });
        assert_eq!(policy.revalidate_after, Duration::from_secs(5));
    }
}
