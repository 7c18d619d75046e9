// tests/providers_reddit.rs
//
// Fixture-driven tests for the Reddit adapter: listing shape, image
// selection, and the durable native id that the normalizer keeps.

use newsdeck::normalize::{normalize_batch, NormalizeOptions};
use newsdeck::sources::reddit::RedditSource;
use newsdeck::sources::ListingSource;

const FIXTURE: &str = r#"{
  "data": {
    "children": [
      {
        "data": {
          "id": "1abcd2",
          "subreddit": "technology",
          "title": "New battery chemistry doubles capacity",
          "url": "https://example.com/battery",
          "author": "electro",
          "created_utc": 1700000000.0,
          "score": 512,
          "num_comments": 128,
          "selftext": "",
          "thumbnail": "self",
          "preview": {
            "images": [
              { "source": { "url": "https://preview.redd.it/img.jpg?width=640&amp;crop=smart" } }
            ]
          }
        }
      },
      {
        "data": {
          "id": "9wxyz8",
          "subreddit": "technology",
          "title": "Discussion thread",
          "url": "/r/technology/comments/9wxyz8",
          "author": "mod",
          "created_utc": 1700000100.0,
          "score": 10,
          "num_comments": 4,
          "selftext": "What do you all think about the new release?"
        }
      },
      { "data": "not an object" }
    ]
  }
}"#;

#[tokio::test]
async fn listing_maps_posts_and_skips_broken_children() {
    let source = RedditSource::from_fixture(FIXTURE);
    let records = source.fetch_listing("technology").await.unwrap();

    assert_eq!(records.len(), 2, "broken child is skipped, not fatal");

    let first = &records[0];
    assert_eq!(first.native_id.as_deref(), Some("1abcd2"));
    assert_eq!(
        first.image_url.as_deref(),
        Some("https://preview.redd.it/img.jpg?width=640&crop=smart"),
        "preview url wins and &amp; is decoded"
    );
    assert_eq!(
        first.description.as_deref(),
        Some("Posted in r/technology by u/electro")
    );
    assert_eq!(first.content.as_deref(), Some("Score: 512 | Comments: 128"));
    assert_eq!(first.source_name.as_deref(), Some("r/technology"));
    assert_eq!(
        first.published_at.as_deref(),
        Some("2023-11-14T22:13:20.000Z")
    );

    let second = &records[1];
    assert_eq!(
        second.url.as_deref(),
        Some("https://reddit.com/r/technology/comments/9wxyz8")
    );
    assert_eq!(
        second.description.as_deref(),
        Some("What do you all think about the new release?")
    );
}

#[tokio::test]
async fn normalized_reddit_articles_keep_native_ids() {
    let source = RedditSource::from_fixture(FIXTURE);
    let records = source.fetch_listing("technology").await.unwrap();
    let articles = normalize_batch(&records, "reddit", &NormalizeOptions::default());

    assert_eq!(articles[0].id, "reddit-1abcd2");
    assert_eq!(articles[1].id, "reddit-9wxyz8");
}

#[tokio::test]
async fn empty_listing_envelope_yields_no_records() {
    let source = RedditSource::from_fixture(r#"{ "data": { "children": [] } }"#);
    let records = source.fetch_listing("technology").await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn malformed_listing_body_is_an_upstream_failure() {
    let source = RedditSource::from_fixture("oops, rate limited");
    assert!(source.fetch_listing("technology").await.is_err());
}

const TRENDING_FIXTURE: &str = r#"{
  "data": {
    "children": [
      { "data": { "id": "t1", "subreddit": "technology", "title": "First hot post" } },
      { "data": { "id": "t2", "subreddit": "technology", "title": "Second hot post" } },
      { "data": { "id": "t3", "subreddit": "technology", "title": "Third hot post" } }
    ]
  }
}"#;

#[tokio::test]
async fn trending_concatenates_subreddits_and_caps_at_ten() {
    // Fixture mode serves the same 3-post listing for each of the 4 trending
    // subreddits: 12 posts fetched, the cap keeps 10.
    let source = RedditSource::from_fixture(TRENDING_FIXTURE);
    let records = source.fetch_trending().await;

    assert_eq!(records.len(), 10);
    assert_eq!(records[0].native_id.as_deref(), Some("t1"));
    assert_eq!(records[9].native_id.as_deref(), Some("t1"), "fourth batch starts at index 9");
}

#[tokio::test]
async fn trending_skips_failing_subreddits_instead_of_failing() {
    // Every per-subreddit fetch fails to parse; trending degrades to an
    // empty feed rather than surfacing an error.
    let source = RedditSource::from_fixture("oops, rate limited");
    let records = source.fetch_trending().await;
    assert!(records.is_empty());
}
