// src/api.rs
//! HTTP surface: server-rendered pages plus a JSON API, wired onto the
//! source adapters. Listings degrade to empty on upstream failure; only the
//! detail page distinguishes "article gone" from "service down".

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::article::Article;
use crate::config::Config;
use crate::normalize::{normalize_batch, NormalizeOptions};
use crate::resolve::resolve_across;
use crate::sources::guardian::GuardianSource;
use crate::sources::newsapi::NewsApiSource;
use crate::sources::reddit::RedditSource;
use crate::sources::twitter::{Tweet, TwitterSource};
use crate::sources::ListingSource;

/// Categories shown on the home page, and searched in order when a detail
/// link is opened.
pub const HOME_CATEGORIES: &[&str] = &["technology", "business", "health"];
const CARDS_PER_SECTION: usize = 3;

#[derive(Clone)]
pub struct AppState {
    pub news: Option<Arc<dyn ListingSource>>,
    pub guardian: Option<Arc<dyn ListingSource>>,
    pub reddit: Option<Arc<RedditSource>>,
    pub twitter: Option<Arc<TwitterSource>>,
    pub normalize: NormalizeOptions,
}

impl AppState {
    /// Build providers from config. A missing credential leaves that slot
    /// empty and its endpoints serving empty feeds.
    pub fn from_config(cfg: &Config) -> Self {
        let news = cfg
            .news_api_key
            .clone()
            .map(|k| Arc::new(NewsApiSource::new(k, cfg.page_size)) as Arc<dyn ListingSource>);
        let guardian = cfg
            .guardian_api_key
            .clone()
            .map(|k| Arc::new(GuardianSource::new(k, cfg.page_size)) as Arc<dyn ListingSource>);
        let reddit = match (cfg.reddit_client_id.clone(), cfg.reddit_client_secret.clone()) {
            (Some(id), Some(secret)) => Some(Arc::new(RedditSource::new(id, secret))),
            _ => None,
        };
        let twitter = cfg
            .twitter_bearer_token
            .clone()
            .map(|t| Arc::new(TwitterSource::new(t)));

        Self {
            news,
            guardian,
            reddit,
            twitter,
            normalize: NormalizeOptions {
                preview_note_threshold: cfg.preview_note_threshold,
            },
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/news/{id}", get(article_page))
        .route("/api/news", get(api_news))
        .route("/api/guardian", get(api_guardian))
        .route("/api/reddit", get(api_reddit))
        .route("/api/reddit/trending", get(api_reddit_trending))
        .route("/api/reddit/search", get(api_reddit_search))
        .route("/api/tweets", get(api_tweets))
        .route("/health", get(|| async { "OK" }))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Fetch and normalize one category, degrading to an empty listing on any
/// upstream failure.
async fn listing(state: &AppState, category: &str) -> Vec<Article> {
    let Some(news) = &state.news else {
        tracing::warn!("news provider not configured");
        return Vec::new();
    };
    match news.fetch_listing(category).await {
        Ok(raws) => normalize_batch(&raws, category, &state.normalize),
        Err(e) => {
            tracing::warn!(error = ?e, category, "listing fetch failed");
            Vec::new()
        }
    }
}

async fn home(State(state): State<AppState>) -> Html<String> {
    let mut sections = Vec::with_capacity(HOME_CATEGORIES.len());
    for category in HOME_CATEGORIES {
        let mut articles = listing(&state, category).await;
        articles.truncate(CARDS_PER_SECTION);
        sections.push((*category, articles));
    }
    Html(render_home(&sections))
}

async fn article_page(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(news) = &state.news else {
        return not_found_page();
    };
    match resolve_across(news.as_ref(), &id, HOME_CATEGORIES, &state.normalize).await {
        Ok(Some(article)) => Html(render_article(&article)).into_response(),
        Ok(None) => not_found_page(),
        Err(e) => {
            tracing::warn!(error = ?e, id = %id, "resolve failed upstream");
            (
                StatusCode::BAD_GATEWAY,
                Html(render_message(
                    "News service unavailable",
                    "The upstream news service could not be reached. Try again shortly.",
                )),
            )
                .into_response()
        }
    }
}

fn not_found_page() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(render_message(
            "Article not found",
            "This article no longer appears in the current listing.",
        )),
    )
        .into_response()
}

async fn api_news(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Vec<Article>> {
    let category = q.get("category").map(String::as_str).unwrap_or("technology");
    Json(listing(&state, category).await)
}

async fn api_guardian(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Vec<Article>> {
    let category = q.get("section").map(String::as_str).unwrap_or("technology");
    let Some(guardian) = &state.guardian else {
        tracing::warn!("guardian provider not configured");
        return Json(Vec::new());
    };
    match guardian.fetch_listing(category).await {
        // Guardian ids carry their own prefix so they never collide with
        // NewsAPI ids for the same category.
        Ok(raws) => Json(normalize_batch(
            &raws,
            &format!("guardian-{category}"),
            &state.normalize,
        )),
        Err(e) => {
            tracing::warn!(error = ?e, category, "guardian fetch failed");
            Json(Vec::new())
        }
    }
}

async fn api_reddit(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Vec<Article>> {
    let subreddit = q.get("subreddit").map(String::as_str).unwrap_or("technology");
    let Some(reddit) = &state.reddit else {
        tracing::warn!("reddit provider not configured");
        return Json(Vec::new());
    };
    match reddit.fetch_posts(subreddit, 10).await {
        Ok(raws) => Json(normalize_batch(&raws, "reddit", &state.normalize)),
        Err(e) => {
            tracing::warn!(error = ?e, subreddit, "reddit fetch failed");
            Json(Vec::new())
        }
    }
}

async fn api_reddit_trending(State(state): State<AppState>) -> Json<Vec<Article>> {
    let Some(reddit) = &state.reddit else {
        return Json(Vec::new());
    };
    let raws = reddit.fetch_trending().await;
    Json(normalize_batch(&raws, "reddit", &state.normalize))
}

async fn api_reddit_search(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Vec<Article>> {
    let Some(query) = q.get("q").filter(|s| !s.is_empty()) else {
        return Json(Vec::new());
    };
    let Some(reddit) = &state.reddit else {
        return Json(Vec::new());
    };
    match reddit.search(query, 10).await {
        Ok(raws) => Json(normalize_batch(&raws, "reddit", &state.normalize)),
        Err(e) => {
            tracing::warn!(error = ?e, query = %query, "reddit search failed");
            Json(Vec::new())
        }
    }
}

async fn api_tweets(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Vec<Tweet>> {
    let query = q.get("query").map(String::as_str).unwrap_or("technology news");
    let Some(twitter) = &state.twitter else {
        tracing::warn!("twitter provider not configured");
        return Json(Vec::new());
    };
    match twitter.fetch_tweets(query).await {
        Ok(tweets) => Json(tweets),
        Err(e) => {
            tracing::warn!(error = ?e, query, "tweet fetch failed");
            Json(Vec::new())
        }
    }
}

// ---- Server-rendered markup (deliberately minimal) ----

fn esc(s: &str) -> String {
    html_escape::encode_text(s).to_string()
}

fn esc_attr(s: &str) -> String {
    html_escape::encode_double_quoted_attribute(s).to_string()
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\">\
<title>{}</title></head><body>{}</body></html>",
        esc(title),
        body
    )
}

fn render_card(article: &Article) -> String {
    format!(
        "<article class=\"card\">\
<a href=\"/news/{id}\"><h3>{title}</h3></a>\
<img src=\"{img}\" alt=\"{title_attr}\">\
<p>{desc}</p>\
<small>{source} &middot; {date}</small>\
</article>",
        id = esc_attr(&article.id),
        title = esc(&article.title),
        title_attr = esc_attr(&article.title),
        img = esc_attr(&article.url_to_image),
        desc = esc(&article.description),
        source = esc(&article.source.name),
        date = esc(&article.published_at),
    )
}

fn render_home(sections: &[(&str, Vec<Article>)]) -> String {
    let mut body = String::from("<header><h1>Newsdeck</h1><p>Your source for the latest news</p></header><main>");
    for (category, articles) in sections {
        body.push_str(&format!("<section><h2>{} News</h2>", esc(category)));
        for article in articles {
            body.push_str(&render_card(article));
        }
        body.push_str("</section>");
    }
    body.push_str("</main><footer><p>Powered by NewsAPI.org</p></footer>");
    page("Newsdeck", &body)
}

fn render_article(article: &Article) -> String {
    let body = format!(
        "<article>\
<h1>{title}</h1>\
<p>Source: {source} &middot; {date}</p>\
<img src=\"{img}\" alt=\"{title_attr}\">\
<p><strong>{desc}</strong></p>\
<p>{content}</p>\
<a href=\"{url}\" target=\"_blank\" rel=\"noopener noreferrer\">Read full article on {source} &rarr;</a>\
</article>",
        title = esc(&article.title),
        title_attr = esc_attr(&article.title),
        source = esc(&article.source.name),
        date = esc(&article.published_at),
        img = esc_attr(&article.url_to_image),
        desc = esc(&article.description),
        content = esc(&article.content),
        url = esc_attr(&article.url),
    );
    page(&article.title, &body)
}

fn render_message(title: &str, message: &str) -> String {
    page(title, &format!("<h1>{}</h1><p>{}</p>", esc(title), esc(message)))
}
