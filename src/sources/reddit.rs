// src/sources/reddit.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::article::RawRecord;
use crate::sources::{decode_each, ensure_metrics_described, ListingSource};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const USER_AGENT: &str = "newsdeck/1.0";
const DESCRIPTION_MAX: usize = 200;

/// Subreddits sampled for the trending feed.
const TRENDING_SUBREDDITS: &[&str] = &["technology", "programming", "news", "worldnews"];
const TRENDING_PER_SUBREDDIT: u32 = 3;
const TRENDING_CAP: usize = 10;

/// Reddit hot-listing adapter (the "link aggregator" upstream).
///
/// Unlike the other two upstreams, Reddit assigns durable post ids, so the
/// records it emits carry `native_id` and the normalizer keeps the genuine
/// id instead of synthesizing one.
pub struct RedditSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        client_id: String,
        client_secret: String,
        client: reqwest::Client,
    },
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: Option<ListingData>,
}

#[derive(Debug, Deserialize, Default)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: String,
    subreddit: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: i64,
    #[serde(default)]
    selftext: String,
    thumbnail: Option<String>,
    preview: Option<Preview>,
}

#[derive(Debug, Deserialize)]
struct Preview {
    #[serde(default)]
    images: Vec<PreviewImage>,
}

#[derive(Debug, Deserialize)]
struct PreviewImage {
    source: Option<PreviewSource>,
}

#[derive(Debug, Deserialize)]
struct PreviewSource {
    url: Option<String>,
}

impl Post {
    fn image_url(&self) -> Option<String> {
        if let Some(url) = self
            .preview
            .as_ref()
            .and_then(|p| p.images.first())
            .and_then(|i| i.source.as_ref())
            .and_then(|s| s.url.as_ref())
        {
            // Preview URLs come back with XML-escaped ampersands.
            return Some(url.replace("&amp;", "&"));
        }
        match self.thumbnail.as_deref() {
            Some(t) if !t.is_empty() && t != "self" && t != "default" => Some(t.to_string()),
            _ => None,
        }
    }

    fn into_raw(self, id_prefix: Option<&str>) -> RawRecord {
        let native_id = match id_prefix {
            Some(prefix) => format!("{prefix}-{}", self.id),
            None => self.id.clone(),
        };

        let description = if self.selftext.is_empty() {
            format!("Posted in r/{} by u/{}", self.subreddit, self.author)
        } else if self.selftext.chars().count() > DESCRIPTION_MAX {
            let head: String = self.selftext.chars().take(DESCRIPTION_MAX).collect();
            format!("{head}...")
        } else {
            self.selftext.clone()
        };

        let url = if self.url.starts_with("http") {
            self.url.clone()
        } else {
            format!("https://reddit.com{}", self.url)
        };

        let published_at = DateTime::<Utc>::from_timestamp(self.created_utc as i64, 0)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true));

        let content = if self.selftext.is_empty() {
            format!("Score: {} | Comments: {}", self.score, self.num_comments)
        } else {
            self.selftext.clone()
        };

        RawRecord {
            native_id: Some(native_id),
            title: Some(self.title.clone()),
            description: Some(description),
            content: Some(content),
            image_url: self.image_url(),
            published_at,
            url: Some(url),
            source_name: Some(format!("r/{}", self.subreddit)),
        }
    }
}

impl RedditSource {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            mode: Mode::Http {
                client_id,
                client_secret,
                client: reqwest::Client::new(),
            },
        }
    }

    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    /// OAuth2 client-credentials grant; a fresh token per fetch, nothing is
    /// cached between requests.
    async fn access_token(
        client: &reqwest::Client,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String> {
        let resp = client
            .post(TOKEN_URL)
            .basic_auth(client_id, Some(client_secret))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("reddit token http post")?;
        if !resp.status().is_success() {
            return Err(anyhow!("reddit auth status {}", resp.status()));
        }
        let token: TokenResponse = resp.json().await.context("parsing reddit token json")?;
        Ok(token.access_token)
    }

    fn parse_body(body: &str, id_prefix: Option<&str>) -> Result<Vec<RawRecord>> {
        let t0 = std::time::Instant::now();
        let listing: Listing =
            serde_json::from_str(body).context("parsing reddit listing json")?;
        let children = listing.data.unwrap_or_default().children;

        let out: Vec<RawRecord> =
            decode_each::<Post>(children.into_iter().map(|c| c.data).collect(), "reddit")
                .into_iter()
                .map(|p| p.into_raw(id_prefix))
                .collect();

        histogram!("fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }

    async fn fetch_url(&self, url: &str, id_prefix: Option<&str>) -> Result<Vec<RawRecord>> {
        ensure_metrics_described();
        counter!("fetch_requests_total").increment(1);

        match &self.mode {
            Mode::Fixture(body) => Self::parse_body(body, id_prefix),
            Mode::Http {
                client_id,
                client_secret,
                client,
            } => {
                let token = Self::access_token(client, client_id, client_secret).await?;
                let resp = match client
                    .get(url)
                    .bearer_auth(&token)
                    .header(reqwest::header::USER_AGENT, USER_AGENT)
                    .send()
                    .await
                {
                    Ok(resp) => resp,
                    Err(e) => {
                        tracing::warn!(error = ?e, provider = "reddit", "provider http error");
                        counter!("fetch_errors_total").increment(1);
                        return Err(e).context("reddit http get");
                    }
                };
                if !resp.status().is_success() {
                    counter!("fetch_errors_total").increment(1);
                    return Err(anyhow!("reddit http status {}", resp.status()));
                }
                let body = resp.text().await.context("reddit http .text()")?;
                Self::parse_body(&body, id_prefix)
            }
        }
    }

    /// Hot posts from one subreddit.
    pub async fn fetch_posts(&self, subreddit: &str, limit: u32) -> Result<Vec<RawRecord>> {
        let url = format!("https://oauth.reddit.com/r/{subreddit}/hot.json?limit={limit}");
        self.fetch_url(&url, None).await
    }

    /// A few hot posts from each trending subreddit, concatenated and capped.
    /// A failing subreddit is skipped, not fatal.
    pub async fn fetch_trending(&self) -> Vec<RawRecord> {
        let mut all = Vec::new();
        for subreddit in TRENDING_SUBREDDITS.iter().copied() {
            match self.fetch_posts(subreddit, TRENDING_PER_SUBREDDIT).await {
                Ok(mut posts) => all.append(&mut posts),
                Err(e) => {
                    tracing::warn!(error = ?e, subreddit, "trending fetch failed");
                }
            }
        }
        all.truncate(TRENDING_CAP);
        all
    }

    /// Site-wide relevance search. Search results get a distinct id prefix so
    /// they never collide with hot-listing ids.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<RawRecord>> {
        let encoded = urlencoding::encode(query);
        let url = format!("https://oauth.reddit.com/search.json?q={encoded}&limit={limit}&sort=relevance");
        self.fetch_url(&url, Some("search")).await
    }
}

#[async_trait]
impl ListingSource for RedditSource {
    /// The "category" of a link aggregator is its subreddit.
    async fn fetch_listing(&self, category: &str) -> Result<Vec<RawRecord>> {
        self.fetch_posts(category, 10).await
    }

    fn name(&self) -> &'static str {
        "reddit"
    }
}
