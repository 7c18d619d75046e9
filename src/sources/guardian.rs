// src/sources/guardian.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::article::RawRecord;
use crate::sources::{decode_each, ensure_metrics_described, ListingSource};

const GUARDIAN_PLACEHOLDER: &str = "https://placehold.co/600x400?text=Guardian";

/// The Guardian content-API adapter (the "newspaper" upstream).
pub struct GuardianSource {
    mode: Mode,
    page_size: u32,
}

enum Mode {
    Fixture(String),
    Http {
        api_key: String,
        client: reqwest::Client,
    },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Option<Response>,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GuardianArticle {
    #[serde(rename = "webTitle")]
    web_title: Option<String>,
    #[serde(rename = "webUrl")]
    web_url: Option<String>,
    #[serde(rename = "webPublicationDate")]
    web_publication_date: Option<String>,
    fields: Option<Fields>,
}

#[derive(Debug, Deserialize, Default)]
struct Fields {
    headline: Option<String>,
    #[serde(rename = "trailText")]
    trail_text: Option<String>,
    #[serde(rename = "bodyText")]
    body_text: Option<String>,
    thumbnail: Option<String>,
}

/// Map our categories onto Guardian sections; anything unmapped falls back
/// to the general news firehose.
pub fn section_for_category(category: &str) -> &'static str {
    match category {
        "technology" => "technology",
        "business" => "business",
        "health" => "lifeandstyle",
        "entertainment" => "culture",
        "sports" => "sport",
        "science" => "science",
        _ => "news",
    }
}

impl GuardianSource {
    pub fn new(api_key: String, page_size: u32) -> Self {
        Self {
            mode: Mode::Http {
                api_key,
                client: reqwest::Client::new(),
            },
            page_size,
        }
    }

    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
            page_size: 10,
        }
    }

    fn parse_body(body: &str) -> Result<Vec<RawRecord>> {
        let t0 = std::time::Instant::now();
        let envelope: Envelope =
            serde_json::from_str(body).context("parsing guardian response json")?;
        let results = envelope
            .response
            .ok_or_else(|| anyhow!("guardian response envelope missing"))?
            .results;

        let out: Vec<RawRecord> = decode_each::<GuardianArticle>(results, "guardian")
            .into_iter()
            .map(|a| {
                let fields = a.fields.unwrap_or_default();
                RawRecord {
                    native_id: None,
                    // The curated headline beats the generic web title.
                    title: fields.headline.or(a.web_title),
                    description: fields.trail_text,
                    content: fields.body_text,
                    image_url: fields
                        .thumbnail
                        .or_else(|| Some(GUARDIAN_PLACEHOLDER.to_string())),
                    published_at: a.web_publication_date,
                    url: a.web_url,
                    source_name: Some("The Guardian".to_string()),
                }
            })
            .collect();

        histogram!("fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }
}

#[async_trait]
impl ListingSource for GuardianSource {
    async fn fetch_listing(&self, category: &str) -> Result<Vec<RawRecord>> {
        ensure_metrics_described();
        counter!("fetch_requests_total").increment(1);

        match &self.mode {
            Mode::Fixture(body) => Self::parse_body(body),
            Mode::Http { api_key, client } => {
                let section = section_for_category(category);
                let url = format!(
                    "https://content.guardianapis.com/search?section={section}&show-fields=headline,trailText,bodyText,thumbnail&page-size={}&api-key={api_key}",
                    self.page_size
                );
                let resp = match client.get(&url).send().await {
                    Ok(resp) => resp,
                    Err(e) => {
                        tracing::warn!(error = ?e, provider = "guardian", "provider http error");
                        counter!("fetch_errors_total").increment(1);
                        return Err(e).context("guardian http get");
                    }
                };
                if !resp.status().is_success() {
                    counter!("fetch_errors_total").increment(1);
                    return Err(anyhow!("guardian http status {}", resp.status()));
                }
                let body = resp.text().await.context("guardian http .text()")?;
                Self::parse_body(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "guardian"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_category_falls_back_to_news() {
        assert_eq!(section_for_category("health"), "lifeandstyle");
        assert_eq!(section_for_category("gardening"), "news");
    }
}
