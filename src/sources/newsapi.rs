// src/sources/newsapi.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::article::RawRecord;
use crate::sources::{decode_each, ensure_metrics_described, ListingSource};

/// NewsAPI.org top-headlines adapter (the "general news" upstream).
pub struct NewsApiSource {
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
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiArticle {
    source: Option<SourceRef>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SourceRef {
    name: Option<String>,
}

impl NewsApiSource {
    pub fn new(api_key: String, page_size: u32) -> Self {
        Self {
            mode: Mode::Http {
                api_key,
                client: reqwest::Client::new(),
            },
            page_size,
        }
    }

    /// Parse a canned response body instead of going over HTTP.
    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
            page_size: 10,
        }
    }

    fn parse_body(body: &str) -> Result<Vec<RawRecord>> {
        let t0 = std::time::Instant::now();
        let envelope: Envelope =
            serde_json::from_str(body).context("parsing newsapi response json")?;

        // The envelope carries its own error channel beside the HTTP status.
        if envelope.status.as_deref() != Some("ok") {
            return Err(anyhow!(
                "newsapi error: {}",
                envelope.message.as_deref().unwrap_or("unknown error")
            ));
        }

        let out: Vec<RawRecord> = decode_each::<ApiArticle>(envelope.articles, "newsapi")
            .into_iter()
            .map(|a| RawRecord {
                native_id: None,
                title: a.title,
                description: a.description,
                content: a.content,
                image_url: a.url_to_image,
                published_at: a.published_at,
                url: a.url,
                source_name: a.source.and_then(|s| s.name),
            })
            .collect();

        histogram!("fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }
}

#[async_trait]
impl ListingSource for NewsApiSource {
    async fn fetch_listing(&self, category: &str) -> Result<Vec<RawRecord>> {
        ensure_metrics_described();
        counter!("fetch_requests_total").increment(1);

        match &self.mode {
            Mode::Fixture(body) => Self::parse_body(body),
            Mode::Http { api_key, client } => {
                let url = format!(
                    "https://newsapi.org/v2/top-headlines?category={category}&language=en&pageSize={}&apiKey={api_key}",
                    self.page_size
                );
                let resp = match client.get(&url).send().await {
                    Ok(resp) => resp,
                    Err(e) => {
                        tracing::warn!(error = ?e, provider = "newsapi", "provider http error");
                        counter!("fetch_errors_total").increment(1);
                        return Err(e).context("newsapi http get");
                    }
                };
                if !resp.status().is_success() {
                    counter!("fetch_errors_total").increment(1);
                    return Err(anyhow!("newsapi http status {}", resp.status()));
                }
                let body = resp.text().await.context("newsapi http .text()")?;
                Self::parse_body(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}
