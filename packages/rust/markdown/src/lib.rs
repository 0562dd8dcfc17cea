//! Detail-view rendering for articles.
//!
//! Converts an article's HTML body to Markdown using the `htmd` crate, runs a
//! cleanup pipeline over it, and lays it out under the article's header
//! (category, date, reading time, cover, tags).

mod cleanup;

use scraper::Html;
use tracing::{debug, instrument};

use folio_shared::{Article, FolioError, Result};

/// Reading speed used for the reading-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A rendered detail view.
#[derive(Debug, Clone)]
pub struct RenderedArticle {
    /// The full Markdown document: header block followed by the body.
    pub markdown: String,
    /// Words in the body's text content.
    pub word_count: usize,
    /// Estimated reading time in whole minutes, at least 1.
    pub reading_minutes: usize,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render an article's detail view as Markdown.
#[instrument(skip_all, fields(slug = %article.slug))]
pub fn render_article(article: &Article) -> Result<RenderedArticle> {
    let html = article.content.as_deref().unwrap_or_default();
    let body = if html.trim().is_empty() {
        String::new()
    } else {
        html_to_markdown(html)?
    };

    let word_count = count_words(html);
    let reading_minutes = reading_minutes(word_count);

    let mut markdown = format!("# {}\n\n", article.title);

    let mut byline: Vec<String> = Vec::new();
    if !article.category.is_empty() {
        byline.push(article.category.clone());
    }
    let published = article.published_display();
    if !published.is_empty() {
        byline.push(published);
    }
    byline.push(format!("{reading_minutes} min read"));
    markdown.push_str(&format!("*{}*\n\n", byline.join(" · ")));

    if !article.excerpt.is_empty() {
        markdown.push_str(&format!("> {}\n\n", article.excerpt));
    }

    if !article.tags.is_empty() {
        let tags: Vec<String> = article.tags.iter().map(|t| format!("`{t}`")).collect();
        markdown.push_str(&format!("Tags: {}\n\n", tags.join(" ")));
    }

    markdown.push_str(&format!("![{}]({})\n\n", article.title, article.cover_image_url()));
    markdown.push_str(&body);

    debug!(word_count, reading_minutes, len = markdown.len(), "article rendered");

    Ok(RenderedArticle {
        markdown,
        word_count,
        reading_minutes,
    })
}

/// Convert an HTML fragment to cleaned Markdown.
pub fn html_to_markdown(html: &str) -> Result<String> {
    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "iframe", "noscript", "svg"])
        .build();

    let raw = converter
        .convert(html)
        .map_err(|e| FolioError::Conversion(format!("htmd conversion failed: {e}")))?;

    Ok(cleanup::run_pipeline(&raw))
}

/// Count words in the text content of an HTML fragment.
pub fn count_words(html: &str) -> usize {
    if html.trim().is_empty() {
        return 0;
    }
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .count()
}

/// Whole minutes to read `word_count` words, never less than one.
pub fn reading_minutes(word_count: usize) -> usize {
    word_count.div_ceil(WORDS_PER_MINUTE).max(1)
}
