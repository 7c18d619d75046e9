// src/sources/twitter.rs
use anyhow::{anyhow, Context, Result};
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::sources::ensure_metrics_described;

/// Twitter recent-search adapter. Tweets feed a sidebar, not article cards,
/// so this source stays outside the `ListingSource`/normalizer pipeline and
/// returns its own record shape.
pub struct TwitterSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        bearer_token: String,
        client: reqwest::Client,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PublicMetrics {
    pub retweet_count: u64,
    pub reply_count: u64,
    pub like_count: u64,
    pub quote_count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    pub created_at: String,
    pub author_id: String,
    pub author_name: String,
    pub author_username: String,
    pub author_profile_image: String,
    pub public_metrics: PublicMetrics,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Vec<RawTweet>,
    includes: Option<Includes>,
}

#[derive(Debug, Deserialize)]
struct RawTweet {
    id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    author_id: String,
    public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Deserialize, Default)]
struct Includes {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
    name: Option<String>,
    username: Option<String>,
    profile_image_url: Option<String>,
}

impl TwitterSource {
    pub fn new(bearer_token: String) -> Self {
        Self {
            mode: Mode::Http {
                bearer_token,
                client: reqwest::Client::new(),
            },
        }
    }

    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    fn parse_body(body: &str) -> Result<Vec<Tweet>> {
        let envelope: Envelope =
            serde_json::from_str(body).context("parsing twitter response json")?;
        let users = envelope.includes.unwrap_or_default().users;

        let tweets = envelope
            .data
            .into_iter()
            .map(|t| {
                // Expansion payload carries authors separately, joined by id.
                let author = users.iter().find(|u| u.id == t.author_id);
                Tweet {
                    id: t.id,
                    text: t.text,
                    created_at: t.created_at,
                    author_id: t.author_id,
                    author_name: author
                        .and_then(|u| u.name.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    author_username: author
                        .and_then(|u| u.username.clone())
                        .unwrap_or_else(|| "unknown".to_string()),
                    author_profile_image: author
                        .and_then(|u| u.profile_image_url.clone())
                        .unwrap_or_default(),
                    public_metrics: t.public_metrics.unwrap_or_default(),
                }
            })
            .collect();
        Ok(tweets)
    }

    pub async fn fetch_tweets(&self, query: &str) -> Result<Vec<Tweet>> {
        ensure_metrics_described();
        counter!("fetch_requests_total").increment(1);

        match &self.mode {
            Mode::Fixture(body) => Self::parse_body(body),
            Mode::Http {
                bearer_token,
                client,
            } => {
                let encoded = urlencoding::encode(query);
                let url = format!(
                    "https://api.twitter.com/2/tweets/search/recent?query={encoded}&tweet.fields=created_at,public_metrics&expansions=author_id&user.fields=name,profile_image_url,username"
                );
                let resp = match client.get(&url).bearer_auth(bearer_token).send().await {
                    Ok(resp) => resp,
                    Err(e) => {
                        tracing::warn!(error = ?e, provider = "twitter", "provider http error");
                        counter!("fetch_errors_total").increment(1);
                        return Err(e).context("twitter http get");
                    }
                };
                if !resp.status().is_success() {
                    counter!("fetch_errors_total").increment(1);
                    return Err(anyhow!("twitter http status {}", resp.status()));
                }
                let body = resp.text().await.context("twitter http .text()")?;
                Self::parse_body(&body)
            }
        }
    }
}
