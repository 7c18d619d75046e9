// tests/providers_twitter.rs
//
// Fixture-driven tests for the tweet feed: author expansion join and
// defaulted metrics.

use newsdeck::sources::twitter::TwitterSource;

const FIXTURE: &str = r#"{
  "data": [
    {
      "id": "180000001",
      "text": "Big model drop today",
      "created_at": "2025-08-20T10:00:00.000Z",
      "author_id": "42",
      "public_metrics": { "retweet_count": 5, "reply_count": 2, "like_count": 30, "quote_count": 1 }
    },
    {
      "id": "180000002",
      "text": "Tweet from an author the expansion forgot",
      "created_at": "2025-08-20T10:05:00.000Z",
      "author_id": "99"
    }
  ],
  "includes": {
    "users": [
      { "id": "42", "name": "Ada L.", "username": "ada", "profile_image_url": "https://pbs.example/ada.jpg" }
    ]
  }
}"#;

#[tokio::test]
async fn authors_are_joined_from_the_expansion_payload() {
    let source = TwitterSource::from_fixture(FIXTURE);
    let tweets = source.fetch_tweets("ai").await.unwrap();

    assert_eq!(tweets.len(), 2);
    assert_eq!(tweets[0].author_name, "Ada L.");
    assert_eq!(tweets[0].author_username, "ada");
    assert_eq!(tweets[0].public_metrics.like_count, 30);
}

#[tokio::test]
async fn unknown_authors_and_metrics_get_defaults() {
    let source = TwitterSource::from_fixture(FIXTURE);
    let tweets = source.fetch_tweets("ai").await.unwrap();

    assert_eq!(tweets[1].author_name, "Unknown");
    assert_eq!(tweets[1].author_username, "unknown");
    assert_eq!(tweets[1].author_profile_image, "");
    assert_eq!(tweets[1].public_metrics.retweet_count, 0);
}

#[tokio::test]
async fn empty_result_set_is_fine() {
    let source = TwitterSource::from_fixture(r#"{ "data": [] }"#);
    let tweets = source.fetch_tweets("nothing").await.unwrap();
    assert!(tweets.is_empty());
}
