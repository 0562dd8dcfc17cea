//! The catalog store: current snapshot plus refresh.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use folio_content::{ContentClient, PostSource};
use folio_shared::Article;

use crate::snapshot::{RefreshPolicy, Snapshot, SnapshotOrigin};

/// Owns the current snapshot for one view.
///
/// Readers take an `Arc<Snapshot>` and are never exposed to a partially built
/// one: refresh builds the replacement off to the side and swaps it in. The
/// lock is never held across an `.await`.
pub struct Catalog<S> {
    client: ContentClient<S>,
    policy: RefreshPolicy,
    current: RwLock<Arc<Snapshot>>,
}

impl<S: PostSource> Catalog<S> {
    /// Catalog seeded with `seed`, fetched as of now.
    pub fn new(client: ContentClient<S>, seed: Vec<Article>, policy: RefreshPolicy) -> Self {
        Self::with_snapshot(client, Snapshot::seeded(seed, Utc::now()), policy)
    }

    /// Catalog seeded from a first fetch.
    pub async fn load(client: ContentClient<S>, policy: RefreshPolicy) -> Self {
        let list = client.fetch_all_articles().await;
        let snapshot = Snapshot::from_list(list, Utc::now());
        Self::with_snapshot(client, snapshot, policy)
    }

    fn with_snapshot(client: ContentClient<S>, snapshot: Snapshot, policy: RefreshPolicy) -> Self {
        Self {
            client,
            policy,
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn client(&self) -> &ContentClient<S> {
        &self.client
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Articles matching `query`, in snapshot order. Never fetches.
    pub fn filter(&self, query: &str) -> Vec<Article> {
        self.snapshot().filter(query).into_iter().cloned().collect()
    }

    /// Article with `slug` in the current snapshot.
    pub fn get(&self, slug: &str) -> Option<Article> {
        self.snapshot().get(slug).cloned()
    }

    /// Re-fetch and replace the snapshot wholesale. Last writer wins.
    ///
    /// A failed fetch replaces the snapshot with an empty, `Unavailable` one.
    #[instrument(skip_all)]
    pub async fn refresh(&self) -> SnapshotOrigin {
        let list = self.client.fetch_all_articles().await;
        let next = Snapshot::from_list(list, Utc::now());
        let origin = next.origin().clone();

        match &origin {
            SnapshotOrigin::Unavailable { reason } => {
                warn!(%reason, "refresh failed, catalog is now empty");
            }
            _ => info!(articles = next.len(), "catalog refreshed"),
        }

        self.replace(next);
        origin
    }

    /// Refresh only when the snapshot is stale. Returns whether it refreshed.
    pub async fn refresh_if_stale(&self) -> bool {
        self.refresh_if_stale_at(Utc::now()).await
    }

    /// [`Catalog::refresh_if_stale`] with an explicit clock reading.
    pub async fn refresh_if_stale_at(&self, now: DateTime<Utc>) -> bool {
        if !self.snapshot().is_stale(now, &self.policy) {
            debug!("catalog snapshot is fresh");
            return false;
        }
        self.refresh().await;
        true
    }

    fn replace(&self, next: Snapshot) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::TimeDelta;
    use folio_content::RawPost;
    use folio_shared::{FolioError, Result, Tags};
    use serde_json::json;

    /// Source that replays scripted `list_posts` answers, then fails.
    #[derive(Default)]
    struct ScriptedSource {
        answers: Mutex<VecDeque<Result<Vec<RawPost>>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn then_ok(self, posts: serde_json::Value) -> Self {
            let posts = serde_json::from_value(posts).unwrap();
            self.answers.lock().unwrap().push_back(Ok(posts));
            self
        }

        fn then_fail(self) -> Self {
            self.answers
                .lock()
                .unwrap()
                .push_back(Err(FolioError::Network("connection reset".into())));
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PostSource for ScriptedSource {
        async fn list_posts(&self) -> Result<Vec<RawPost>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FolioError::Network("script exhausted".into())))
        }

        async fn posts_by_slug(&self, _slug: &str) -> Result<Vec<RawPost>> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    /// Source whose `list_posts` parks until released.
    struct GatedSource {
        entered: tokio::sync::Notify,
        release: tokio::sync::Notify,
        posts: Vec<RawPost>,
    }

    impl GatedSource {
        fn new(posts: serde_json::Value) -> Self {
            Self {
                entered: tokio::sync::Notify::new(),
                release: tokio::sync::Notify::new(),
                posts: serde_json::from_value(posts).unwrap(),
            }
        }
    }

    #[async_trait]
    impl PostSource for GatedSource {
        async fn list_posts(&self) -> Result<Vec<RawPost>> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(self.posts.clone())
        }

        async fn posts_by_slug(&self, _slug: &str) -> Result<Vec<RawPost>> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "gated"
        }
    }

    fn article(slug: &str, title: &str, tags: &[&str]) -> Article {
        Article {
            id: slug.into(),
            title: title.into(),
            slug: slug.into(),
            excerpt: String::new(),
            content: None,
            published_at: None,
            category: String::new(),
            tags: Tags::from_list(tags),
            cover_image: None,
        }
    }

    fn seed() -> Vec<Article> {
        vec![
            article("intro-to-rust", "Intro to Rust", &["rust", "systems"]),
            article("cooking-pasta", "Cooking Pasta", &["food"]),
            article("rust-ownership", "Rust Ownership", &["rust"]),
        ]
    }

    fn titles(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.title.as_str()).collect()
    }

    #[test]
    fn seeded_catalog_filters_locally() {
        let catalog = Catalog::new(
            ContentClient::new(ScriptedSource::default()),
            seed(),
            RefreshPolicy::default(),
        );

        assert_eq!(titles(&catalog.filter("rust")), ["Intro to Rust", "Rust Ownership"]);
        assert_eq!(titles(&catalog.filter("pasta")), ["Cooking Pasta"]);
        assert!(catalog.filter("zzz").is_empty());
        assert_eq!(catalog.filter("   ").len(), 3);
        assert_eq!(catalog.get("cooking-pasta").map(|a| a.title), Some("Cooking Pasta".into()));

        assert_eq!(catalog.client().source().calls(), 0, "filter must not fetch");
    }

    #[tokio::test]
    async fn refresh_replaces_snapshot() {
        let source = ScriptedSource::default().then_ok(json!([
            { "id": "9", "slug": "fresh", "title": "Fresh Post", "tags": "new" }
        ]));
        let catalog = Catalog::new(ContentClient::new(source), seed(), RefreshPolicy::default());

        let before = catalog.snapshot();
        let origin = catalog.refresh().await;

        assert_eq!(origin, SnapshotOrigin::Loaded);
        assert_eq!(titles(&catalog.filter("")), ["Fresh Post"]);
        assert!(catalog.get("intro-to-rust").is_none());
        // Readers holding the old snapshot keep seeing it unchanged.
        assert_eq!(before.len(), 3);
    }

    #[tokio::test]
    async fn previous_snapshot_stays_visible_during_refresh() {
        let source = GatedSource::new(json!([
            { "id": "9", "slug": "fresh", "title": "Fresh Post" }
        ]));
        let catalog = Catalog::new(ContentClient::new(source), seed(), RefreshPolicy::default());
        let gate = catalog.client().source();

        let refresh = catalog.refresh();
        tokio::pin!(refresh);

        tokio::select! {
            _ = &mut refresh => panic!("refresh completed while the fetch was parked"),
            _ = gate.entered.notified() => {}
        }

        assert_eq!(
            titles(&catalog.filter("")),
            ["Intro to Rust", "Cooking Pasta", "Rust Ownership"]
        );
        assert_eq!(titles(&catalog.filter("pasta")), ["Cooking Pasta"]);

        gate.release.notify_one();
        assert_eq!(refresh.await, SnapshotOrigin::Loaded);
        assert_eq!(titles(&catalog.filter("")), ["Fresh Post"]);
    }

    #[tokio::test]
    async fn failed_refresh_empties_catalog_but_flags_it() {
        let source = ScriptedSource::default().then_fail();
        let catalog = Catalog::new(ContentClient::new(source), seed(), RefreshPolicy::default());

        let origin = catalog.refresh().await;

        assert!(matches!(origin, SnapshotOrigin::Unavailable { .. }));
        assert!(catalog.filter("").is_empty());
        assert!(catalog.snapshot().needs_retry());
    }

    #[tokio::test]
    async fn sequential_refreshes_keep_the_last() {
        let source = ScriptedSource::default()
            .then_ok(json!([{ "id": "1", "slug": "one", "title": "One" }]))
            .then_ok(json!([{ "id": "2", "slug": "two", "title": "Two" }]));
        let catalog = Catalog::new(ContentClient::new(source), Vec::new(), RefreshPolicy::default());

        catalog.refresh().await;
        catalog.refresh().await;

        assert_eq!(titles(&catalog.filter("")), ["Two"]);
    }

    #[tokio::test]
    async fn load_seeds_from_first_fetch() {
        let source = ScriptedSource::default().then_ok(json!([
            { "id": "1", "slug": "a", "title": "Hello World", "tags": ["rust", "cli"] }
        ]));
        let catalog = Catalog::load(ContentClient::new(source), RefreshPolicy::default()).await;

        assert_eq!(catalog.snapshot().origin(), &SnapshotOrigin::Loaded);
        for query in ["hello", "HELLO", "Hello World", "cli"] {
            assert_eq!(catalog.filter(query).len(), 1, "query {query:?}");
        }
    }

    #[tokio::test]
    async fn load_failure_is_empty_not_error() {
        let catalog =
            Catalog::load(ContentClient::new(ScriptedSource::default().then_fail()), RefreshPolicy::default())
                .await;
        assert!(catalog.snapshot().is_empty());
        assert!(catalog.snapshot().needs_retry());
    }

    #[tokio::test]
    async fn refresh_if_stale_honours_window() {
        let source = ScriptedSource::default()
            .then_ok(json!([{ "id": "1", "slug": "a", "title": "A" }]));
        let catalog = Catalog::new(ContentClient::new(source), seed(), RefreshPolicy::default());
        let fetched_at = catalog.snapshot().fetched_at();

        assert!(!catalog.refresh_if_stale_at(fetched_at + TimeDelta::seconds(10)).await);
        assert_eq!(catalog.client().source().calls(), 0);

        assert!(catalog.refresh_if_stale_at(fetched_at + TimeDelta::seconds(61)).await);
        assert_eq!(catalog.client().source().calls(), 1);
        assert_eq!(titles(&catalog.filter("")), ["A"]);
    }

    #[tokio::test]
    async fn zero_window_always_refreshes() {
        let source = ScriptedSource::default()
            .then_ok(json!([]))
            .then_ok(json!([]));
        let policy = RefreshPolicy {
            revalidate_after: std::time::Duration::ZERO,
        };
        let catalog = Catalog::new(ContentClient::new(source), Vec::new(), policy);

        assert!(catalog.refresh_if_stale().await);
        assert!(catalog.refresh_if_stale().await);
        assert_eq!(catalog.client().source().calls(), 2);
    }
}
