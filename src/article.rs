// src/article.rs
//! Canonical article model shared by every upstream source.

use serde::{Deserialize, Serialize};

/// Partial record emitted by an upstream adapter before normalization.
///
/// Every field is optional: upstream payloads routinely omit fields, send
/// nulls, or send empty strings. Adapters only reshape vendor JSON into this
/// common layout; filling the gaps is the normalizer's job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Durable upstream identifier, when the vendor assigns one.
    /// Only the Reddit adapter populates this today.
    pub native_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub published_at: Option<String>,
    pub url: Option<String>,
    pub source_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub name: String,
}

/// Fully populated article as consumed by the rendering layer.
///
/// Every field is guaranteed non-empty after normalization; serde names match
/// the JSON contract of the public API (`urlToImage`, `publishedAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    #[serde(rename = "urlToImage")]
    pub url_to_image: String,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    pub url: String,
    pub source: ArticleSource,
}
