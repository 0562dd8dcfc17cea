//! Post-conversion cleanup for article bodies.
//!
//! Each pass is a function `&str -> String` applied in sequence.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full cleanup pipeline on a converted article body.
pub(crate) fn run_pipeline(md: &str) -> String {
    let mut result = md.to_string();

    result = demote_headings(&result);
    result = strip_leftover_html(&result);
    result = normalize_whitespace(&result);
    result = collapse_blank_lines(&result);
    result = ensure_trailing_newline(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass 1: Demote headings
// ---------------------------------------------------------------------------

/// Push every body heading down one level. The article title owns the H1.
fn demote_headings(md: &str) -> String {
    static H_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(#{1,6})(\s+.+)$").expect("valid regex"));

    let mut in_code_block = false;
    md.lines()
        .map(|line| {
            if line.trim_start().starts_with("```") {
                in_code_block = !in_code_block;
            }
            if in_code_block {
                return line.to_string();
            }
            match H_RE.captures(line) {
                Some(caps) if caps[1].len() < 6 => format!("#{}{}", &caps[1], &caps[2]),
                _ => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Pass 2: Strip leftover HTML
// ---------------------------------------------------------------------------

/// Remove layout tags the rich-text editor leaves behind, keeping their text.
fn strip_leftover_html(md: &str) -> String {
    static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"</?(?:div|span|section|figure|figcaption|u|mark)(?:\s[^>]*)?>")
            .expect("valid regex")
    });

    let mut in_code_block = false;
    md.lines()
        .map(|line| {
            if line.trim_start().starts_with("```") {
                in_code_block = !in_code_block;
                return line.to_string();
            }
            if in_code_block {
                line.to_string()
            } else {
                TAG_RE.replace_all(line, "").into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Pass 3: Whitespace
// ---------------------------------------------------------------------------

fn normalize_whitespace(md: &str) -> String {
    md.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// At most one blank line between blocks.
fn collapse_blank_lines(md: &str) -> String {
    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    MULTI_BLANK_RE.replace_all(md.trim_start_matches('\n'), "\n\n").into_owned()
}

fn ensure_trailing_newline(md: &str) -> String {
    let trimmed = md.trim_end_matches('\n');
    format!("{trimmed}\n")
}
