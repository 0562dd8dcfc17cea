//! Terminal rendering of catalog views.

use serde::Serialize;

use folio_catalog::{MatchField, SearchQuery, Snapshot};
use folio_shared::Article;

/// One listing row: date, category, title, slug and tags.
pub(crate) fn article_row(article: &Article) -> String {
    let date = article
        .published_at
        .map(|at| at.format("%b %-d, %Y").to_string())
        .unwrap_or_default();

    let mut row = format!(
        "  {date:<12}  {category:<14}  {title}  ({slug})",
        category = article.category,
        title = article.title,
        slug = article.slug,
    );
    if !article.tags.is_empty() {
        row.push_str(&format!("  [{}]", article.tags.iter().collect::<Vec<_>>().join(", ")));
    }
    row
}

/// `Found 2 articles for "rust"`.
pub(crate) fn found_summary(count: usize, query: &str) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("Found {count} article{plural} for \"{query}\"")
}

/// Shown under the summary when a search matched nothing.
pub(crate) fn no_match_message(query: &str) -> String {
    format!("No articles match your search for \"{query}\"")
}

/// Human label for where a query matched.
pub(crate) fn match_label(article: &Article, field: MatchField) -> String {
    match field {
        MatchField::Title => "title".into(),
        MatchField::Excerpt => "excerpt".into(),
        MatchField::Category => "category".into(),
        MatchField::Tag(i) => format!("tag '{}'", article.tags.as_slice()[i]),
    }
}

/// Lines shown when a snapshot has nothing to list.
pub(crate) fn empty_message(snapshot: &Snapshot) -> Vec<String> {
    let mut lines = vec!["No articles available.".to_string()];
    if snapshot.needs_retry() {
        lines.push(
            "The content source could not be reached. Try again, or run with -v for details."
                .to_string(),
        );
    }
    lines
}

pub(crate) fn print_listing(snapshot: &Snapshot) {
    if snapshot.is_empty() {
        for line in empty_message(snapshot) {
            println!("{line}");
        }
        return;
    }
    for article in snapshot.articles() {
        println!("{}", article_row(article));
    }
}

pub(crate) fn print_matches(snapshot: &Snapshot, query: &str) {
    if snapshot.is_empty() {
        for line in empty_message(snapshot) {
            println!("{line}");
        }
        return;
    }

    let parsed = SearchQuery::parse(query);
    let matches = parsed.apply(snapshot.articles());

    if !parsed.is_match_all() {
        println!("{}", found_summary(matches.len(), query));
        if matches.is_empty() {
            println!("{}", no_match_message(query));
        }
    }
    for article in matches {
        match parsed.matched_field(article) {
            Some(field) => println!("{}  (matched {})", article_row(article), match_label(article, field)),
            None => println!("{}", article_row(article)),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct SearchHit<'a> {
    #[serde(flatten)]
    pub article: &'a Article,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<MatchField>,
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> color_eyre::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
