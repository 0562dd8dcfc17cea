//! Fail-open fetch operations over a [`PostSource`].
//!
//! No fault crosses this boundary. Failures are logged and turned into
//! [`ArticleList::Unavailable`] / [`ArticleLookup::Unavailable`] so a page
//! render never hard-fails because the content source hiccuped.

use tracing::{debug, error, info, instrument, warn};

use folio_shared::{Article, ContentConfig, Result};

use crate::graphql::GraphQlSource;
use crate::normalize::{normalize_post, normalize_posts};
use crate::source::PostSource;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Outcome of [`ContentClient::fetch_all_articles`].
#[derive(Debug, Clone, PartialEq)]
pub enum ArticleList {
    /// The source answered. The list may be genuinely empty.
    Loaded(Vec<Article>),
    /// The fetch failed; treat the catalog as unknown, not empty.
    Unavailable { reason: String },
}

impl ArticleList {
    /// Articles to render. Empty when unavailable.
    pub fn articles(&self) -> &[Article] {
        match self {
            Self::Loaded(articles) => articles,
            Self::Unavailable { .. } => &[],
        }
    }

    /// Fail-open view: the articles, or an empty sequence on failure.
    pub fn into_articles(self) -> Vec<Article> {
        match self {
            Self::Loaded(articles) => articles,
            Self::Unavailable { .. } => Vec::new(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Outcome of [`ContentClient::fetch_article_by_slug`].
#[derive(Debug, Clone, PartialEq)]
pub enum ArticleLookup {
    Found(Box<Article>),
    /// The source answered but no post has that slug.
    NotFound,
    /// The lookup failed before the source could answer.
    Unavailable { reason: String },
}

impl ArticleLookup {
    /// Fail-open view: not-found and failure both read as absent.
    pub fn into_article(self) -> Option<Article> {
        match self {
            Self::Found(article) => Some(*article),
            Self::NotFound | Self::Unavailable { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ContentClient
// ---------------------------------------------------------------------------

/// The content fetch client. Construct once and inject where needed.
pub struct ContentClient<S> {
    source: S,
}

impl ContentClient<GraphQlSource> {
    /// Client for the configured GraphQL endpoint.
    pub fn from_config(config: &ContentConfig) -> Result<Self> {
        Ok(Self::new(GraphQlSource::new(config)?))
    }
}

impl<S: PostSource> ContentClient<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch and normalize every article the source exposes.
    #[instrument(skip_all, fields(source = self.source.name()))]
    pub async fn fetch_all_articles(&self) -> ArticleList {
        match self.source.list_posts().await {
            Ok(raw) => {
                let fetched = raw.len();
                let articles = normalize_posts(raw);
                debug!(
                    slugs = ?articles.iter().map(|a| a.slug.as_str()).collect::<Vec<_>>(),
                    "available slugs"
                );
                info!(fetched, kept = articles.len(), "articles fetched");
                ArticleList::Loaded(articles)
            }
            Err(e) => {
                error!(error = %e, "failed to fetch articles");
                ArticleList::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Fetch one article, with its body, by exact slug.
    #[instrument(skip_all, fields(source = self.source.name(), slug = %slug))]
    pub async fn fetch_article_by_slug(&self, slug: &str) -> ArticleLookup {
        if slug.trim().is_empty() {
            warn!("refusing lookup with blank slug");
            return ArticleLookup::NotFound;
        }

        let raw = match self.source.posts_by_slug(slug).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "failed to fetch article");
                return ArticleLookup::Unavailable {
                    reason: e.to_string(),
                };
            }
        };

        match raw
            .into_iter()
            .filter_map(normalize_post)
            .find(|article| article.slug == slug)
        {
            Some(article) => {
                debug!(id = %article.id, "article found");
                ArticleLookup::Found(Box::new(article))
            }
            None => {
                warn!("no article found for slug");
                ArticleLookup::NotFound
            }
        }
    }
}
