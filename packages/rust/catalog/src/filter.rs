//! Case-insensitive substring filter over articles.

use serde::Serialize;

use folio_shared::Article;

/// Which field satisfied a query, checked in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Title,
    Excerpt,
    Category,
    /// Index into the article's tags.
    Tag(usize),
}

/// A parsed filter query.
///
/// A blank or whitespace-only query matches everything. Any other query is
/// matched literally, whitespace included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    needle: Option<String>,
}

impl SearchQuery {
    pub fn parse(raw: &str) -> Self {
        Self {
            needle: (!raw.trim().is_empty()).then(|| raw.to_lowercase()),
        }
    }

    pub fn is_match_all(&self) -> bool {
        self.needle.is_none()
    }

    /// First field of `article` containing the query, if any.
    ///
    /// A match-all query reports `None` even though it matches.
    pub fn matched_field(&self, article: &Article) -> Option<MatchField> {
        let needle = self.needle.as_deref()?;
        let hit = |text: &str| text.to_lowercase().contains(needle);

        if hit(&article.title) {
            Some(MatchField::Title)
        } else if hit(&article.excerpt) {
            Some(MatchField::Excerpt)
        } else if hit(&article.category) {
            Some(MatchField::Category)
        } else {
            article.tags.iter().position(hit).map(MatchField::Tag)
        }
    }

    pub fn matches(&self, article: &Article) -> bool {
        self.is_match_all() || self.matched_field(article).is_some()
    }

    /// Stable filter: matching articles in their original order.
    pub fn apply<'a>(&self, articles: &'a [Article]) -> Vec<&'a Article> {
        articles.iter().filter(|a| self.matches(a)).collect()
    }
}
