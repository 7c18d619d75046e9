// src/normalize.rs
//! Normalizer: total mapping from partial upstream records to fully
//! populated [`Article`]s.
//!
//! Two of the three upstream sources assign no durable identifiers, so ids
//! are synthesized as `{category}-{index}-{slug}`. The ordinal index makes
//! ids unique within one batch but NOT stable across fetches (upstream
//! ordering can change between calls); the resolver's fallback matching in
//! [`crate::resolve`] exists to paper over exactly that.

use chrono::{SecondsFormat, Utc};
use metrics::counter;
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::article::{Article, ArticleSource, RawRecord};

pub const NO_TITLE: &str = "No title available";
pub const NO_DESCRIPTION: &str = "No description available";
pub const NO_CONTENT: &str = "No content available";
pub const NO_IMAGE: &str = "https://placehold.co/600x400?text=No+Image";
pub const NO_SOURCE: &str = "Unknown Source";
pub const NO_URL: &str = "#";

const PREVIEW_NOTE: &str = " (This is just a preview. The full article is much longer.)";
const SLUG_MAX_CHARS: usize = 50;

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Truncated-content payloads end with `[+N chars]`. When N exceeds this
    /// threshold a preview note is appended to the content.
    pub preview_note_threshold: u64,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            preview_note_threshold: 5_000,
        }
    }
}

/// Derive the slug component of a synthesized id.
///
/// Lowercase, strip everything that is not a word character, whitespace or
/// hyphen, collapse whitespace runs to single hyphens, cap at 50 characters.
pub fn slug_for_title(title: &str) -> String {
    static RE_STRIP: OnceCell<Regex> = OnceCell::new();
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_strip = RE_STRIP.get_or_init(|| Regex::new(r"[^\w\s-]").unwrap());
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());

    let lowered = title.to_lowercase();
    let stripped = re_strip.replace_all(&lowered, "");
    let slug = re_ws.replace_all(&stripped, "-");
    slug.chars().take(SLUG_MAX_CHARS).collect()
}

/// Append the preview note to content that upstream cut off hard.
///
/// NewsAPI signals truncation with a trailing `[+N chars]` marker; the marker
/// itself is left in place, only a note is appended when N is large.
fn process_content(content: &str, threshold: u64) -> String {
    static RE_TRUNC: OnceCell<Regex> = OnceCell::new();
    let re = RE_TRUNC.get_or_init(|| Regex::new(r"\[\+(\d+) chars\]$").unwrap());

    if let Some(caps) = re.captures(content) {
        let cut: u64 = caps[1].parse().unwrap_or(0);
        if cut > threshold {
            return format!("{content}{PREVIEW_NOTE}");
        }
    }
    content.to_string()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Map one raw record to its canonical article. Never fails: every absent,
/// null or empty field resolves to its documented default.
pub fn normalize_record(
    raw: &RawRecord,
    index: usize,
    category: &str,
    opts: &NormalizeOptions,
) -> Article {
    let slug = non_empty(&raw.title)
        .map(slug_for_title)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("article-{index}"));

    // Prefer a genuine upstream id when the source assigns one; synthesize
    // otherwise.
    let id = match non_empty(&raw.native_id) {
        Some(native) => format!("reddit-{native}"),
        None => format!("{category}-{index}-{slug}"),
    };

    Article {
        id,
        title: non_empty(&raw.title).unwrap_or(NO_TITLE).to_string(),
        description: non_empty(&raw.description)
            .unwrap_or(NO_DESCRIPTION)
            .to_string(),
        content: non_empty(&raw.content)
            .map(|c| process_content(c, opts.preview_note_threshold))
            .unwrap_or_else(|| NO_CONTENT.to_string()),
        url_to_image: non_empty(&raw.image_url).unwrap_or(NO_IMAGE).to_string(),
        published_at: non_empty(&raw.published_at)
            .map(str::to_string)
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        url: non_empty(&raw.url).unwrap_or(NO_URL).to_string(),
        source: ArticleSource {
            name: non_empty(&raw.source_name).unwrap_or(NO_SOURCE).to_string(),
        },
    }
}

/// Batch form of [`normalize_record`], preserving input order. The ordinal
/// id component equals the record's position in the input.
pub fn normalize_batch(
    raws: &[RawRecord],
    category: &str,
    opts: &NormalizeOptions,
) -> Vec<Article> {
    let out: Vec<Article> = raws
        .iter()
        .enumerate()
        .map(|(i, raw)| normalize_record(raw, i, category, opts))
        .collect();
    counter!("records_normalized_total").increment(out.len() as u64);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_strips_punctuation_and_hyphenates() {
        assert_eq!(slug_for_title("Breaking: AI, Wins!!"), "breaking-ai-wins");
    }

    #[test]
    fn slug_keeps_existing_hyphens() {
        assert_eq!(slug_for_title("state-of-the-art model"), "state-of-the-art-model");
    }

    #[test]
    fn slug_caps_at_fifty_chars() {
        let long = "word ".repeat(30);
        assert_eq!(slug_for_title(&long).chars().count(), 50);
    }

    #[test]
    fn preview_note_only_past_threshold() {
        let small = "Intro text [+1200 chars]";
        assert_eq!(process_content(small, 5_000), small);

        let big = "Intro text [+6200 chars]";
        let out = process_content(big, 5_000);
        assert!(out.starts_with(big));
        assert!(out.ends_with("much longer.)"));
    }

    #[test]
    fn marker_must_be_at_end() {
        let s = "cut [+9000 chars] and then more";
        assert_eq!(process_content(s, 5_000), s);
    }
}
