// src/resolve.rs
//! Resolver: map an opaque article id from a link back to a concrete
//! [`Article`] in a freshly fetched listing.
//!
//! Synthesized ids embed a positional index, and upstream listings are not
//! guaranteed to reproduce the same ordering or content on a later call, so
//! an id that was valid when the link was rendered may no longer match
//! exactly. Resolution therefore runs three steps in order, first success
//! wins:
//!
//! 1. exact id equality,
//! 2. substring containment in either direction,
//! 3. token overlap between the id's slug tokens and candidate titles.
//!
//! "Not found" is a normal outcome (`Ok(None)`); an upstream failure is a
//! distinct error so callers can tell "the API is down" from "this article
//! no longer appears in the listing".

use anyhow::{Context, Result};
use metrics::counter;

use crate::article::Article;
use crate::normalize::{normalize_batch, NormalizeOptions};
use crate::sources::ListingSource;

// Slug tokens this short are noise ("the", "ai", index digits).
const MIN_TOKEN_LEN: usize = 4;

/// Pure matching core, exercised directly by tests.
///
/// Step 3 drops the first two `-`-separated segments (category and ordinal),
/// keeps tokens longer than three characters, and qualifies a candidate when
/// strictly more than half the tokens occur in its lowercased title. A tie
/// at exactly half fails. The first qualifying candidate in batch order wins;
/// there is no score maximization across candidates.
pub fn match_in_batch<'a>(batch: &'a [Article], opaque_id: &str) -> Option<&'a Article> {
    // An empty id would substring-match every candidate in step 2.
    if opaque_id.is_empty() {
        return None;
    }

    // 1) Exact id match.
    if let Some(article) = batch.iter().find(|a| a.id == opaque_id) {
        return Some(article);
    }

    // 2) Substring containment, either direction. Catches ids whose category
    //    or ordinal drifted between the two fetches.
    if let Some(article) = batch
        .iter()
        .find(|a| a.id.contains(opaque_id) || opaque_id.contains(a.id.as_str()))
    {
        counter!("resolve_fallback_total").increment(1);
        return Some(article);
    }

    // 3) Token overlap against titles.
    let tokens: Vec<&str> = opaque_id
        .split('-')
        .skip(2)
        .filter(|t| t.len() >= MIN_TOKEN_LEN)
        .collect();
    if tokens.is_empty() {
        return None;
    }

    for article in batch {
        let title = article.title.to_lowercase();
        let matched = tokens.iter().filter(|t| title.contains(**t)).count();
        if matched as f64 > tokens.len() as f64 / 2.0 {
            counter!("resolve_fallback_total").increment(1);
            return Some(article);
        }
    }

    None
}

/// Re-fetch the listing for `category_hint`, normalize it, and search it for
/// `opaque_id`.
///
/// `Ok(None)` is "not found"; `Err` is "upstream unavailable" and carries the
/// fetch failure.
pub async fn resolve(
    source: &dyn ListingSource,
    opaque_id: &str,
    category_hint: &str,
    opts: &NormalizeOptions,
) -> Result<Option<Article>> {
    let raws = source
        .fetch_listing(category_hint)
        .await
        .with_context(|| format!("fetching '{category_hint}' listing from {}", source.name()))?;

    let batch = normalize_batch(&raws, category_hint, opts);
    match match_in_batch(&batch, opaque_id) {
        Some(article) => Ok(Some(article.clone())),
        None => {
            counter!("resolve_not_found_total").increment(1);
            Ok(None)
        }
    }
}

/// Search several categories in sequence, first hit wins. Detail pages use
/// this because a link carries no reliable record of which listing produced
/// it. An upstream failure aborts the whole search.
pub async fn resolve_across(
    source: &dyn ListingSource,
    opaque_id: &str,
    categories: &[&str],
    opts: &NormalizeOptions,
) -> Result<Option<Article>> {
    for category in categories {
        if let Some(article) = resolve(source, opaque_id, category, opts).await? {
            return Ok(Some(article));
        }
    }
    Ok(None)
}
