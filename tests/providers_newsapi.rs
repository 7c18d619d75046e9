// tests/providers_newsapi.rs
//
// Fixture-driven tests for the NewsAPI adapter: vendor JSON in, RawRecords
// out, with per-record skip on malformed elements.

use newsdeck::sources::newsapi::NewsApiSource;
use newsdeck::sources::ListingSource;

const OK_FIXTURE: &str = r#"{
  "status": "ok",
  "totalResults": 2,
  "articles": [
    {
      "source": { "id": null, "name": "The Verge" },
      "author": "A. Writer",
      "title": "Chipmakers rally on new fab news",
      "description": "Stocks jump.",
      "url": "https://example.com/chips",
      "urlToImage": "https://example.com/chips.jpg",
      "publishedAt": "2025-08-20T09:00:00Z",
      "content": "Chip stocks rallied today... [+5400 chars]"
    },
    {
      "source": { "id": null, "name": null },
      "title": null,
      "description": null,
      "url": null,
      "urlToImage": null,
      "publishedAt": null,
      "content": null
    }
  ]
}"#;

#[tokio::test]
async fn fixture_listing_maps_vendor_fields() {
    let source = NewsApiSource::from_fixture(OK_FIXTURE);
    let records = source.fetch_listing("technology").await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title.as_deref(), Some("Chipmakers rally on new fab news"));
    assert_eq!(records[0].image_url.as_deref(), Some("https://example.com/chips.jpg"));
    assert_eq!(records[0].source_name.as_deref(), Some("The Verge"));
    assert_eq!(
        records[0].content.as_deref(),
        Some("Chip stocks rallied today... [+5400 chars]")
    );
    assert_eq!(records[0].native_id, None, "newsapi has no durable ids");

    // Nulls survive as None; defaults are the normalizer's business.
    assert_eq!(records[1].title, None);
    assert_eq!(records[1].source_name, None);
}

#[tokio::test]
async fn envelope_error_status_is_an_upstream_failure() {
    let source = NewsApiSource::from_fixture(
        r#"{ "status": "error", "code": "apiKeyInvalid", "message": "Your key is bad." }"#,
    );
    let err = source.fetch_listing("technology").await.unwrap_err();
    assert!(err.to_string().contains("Your key is bad"));
}

#[tokio::test]
async fn malformed_body_is_an_upstream_failure() {
    let source = NewsApiSource::from_fixture("<html>502 Bad Gateway</html>");
    assert!(source.fetch_listing("technology").await.is_err());
}

#[tokio::test]
async fn single_malformed_record_is_skipped_not_fatal() {
    let source = NewsApiSource::from_fixture(
        r#"{
          "status": "ok",
          "articles": [
            { "title": "Good record" },
            42,
            { "title": 17 }
          ]
        }"#,
    );
    let records = source.fetch_listing("technology").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title.as_deref(), Some("Good record"));
}

#[tokio::test]
async fn empty_articles_list_is_a_valid_listing() {
    let source = NewsApiSource::from_fixture(r#"{ "status": "ok", "articles": [] }"#);
    let records = source.fetch_listing("technology").await.unwrap();
    assert!(records.is_empty());
}
