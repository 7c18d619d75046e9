// src/sources/mod.rs
pub mod guardian;
pub mod newsapi;
pub mod reddit;
pub mod twitter;

use anyhow::Result;
use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;

use crate::article::RawRecord;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("fetch_requests_total", "Upstream listing fetches attempted.");
        describe_counter!("fetch_errors_total", "Upstream fetch/parse errors.");
        describe_counter!(
            "records_normalized_total",
            "Raw records normalized into articles."
        );
        describe_counter!(
            "records_skipped_total",
            "Raw records dropped because they failed to decode."
        );
        describe_counter!(
            "resolve_fallback_total",
            "Resolutions that needed a fuzzy-matching step."
        );
        describe_counter!(
            "resolve_not_found_total",
            "Resolutions that exhausted every matching step."
        );
        describe_histogram!("fetch_ms", "Upstream fetch+parse time in milliseconds.");
    });
}

/// A listing upstream: one topical category in, raw records out.
///
/// `Err` means the upstream is unavailable (network failure, non-2xx status,
/// malformed envelope). An empty vec is a valid, successful listing.
#[async_trait::async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_listing(&self, category: &str) -> Result<Vec<RawRecord>>;
    fn name(&self) -> &'static str;
}

/// Decode each vendor record individually, skipping the ones that are too
/// broken to decode. A single malformed element never fails the batch.
pub(crate) fn decode_each<T: DeserializeOwned>(
    items: Vec<serde_json::Value>,
    provider: &'static str,
) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(v) => out.push(v),
            Err(e) => {
                tracing::warn!(error = %e, provider, index = i, "skipping malformed record");
                metrics::counter!("records_skipped_total").increment(1);
            }
        }
    }
    out
}
