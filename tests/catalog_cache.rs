use lupe_discover::cache::{ManualClock, ResponseCache, CACHE_DURATION};
use lupe_discover::catalog::{CatalogClient, DEFAULT_PAGE};
use lupe_discover::{CachedFetcher, Config};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn popular_body() -> serde_json::Value {
    json!({
        "results": [
            {"id": 603, "title": "The Matrix", "poster_path": "/m.jpg", "vote_average": 8.2,
             "release_date": "1999-03-31", "overview": "...", "genre_ids": [28, 878]}
        ],
        "page": 1,
        "total_pages": 500,
        "total_results": 10000
    })
}

#[tokio::test]
async fn test_popular_movies_are_fetched_once_then_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .and(query_param("page", "1"))
        .and(query_param("api_key", "secret"))
        .and(query_param("language", "en-US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(popular_body()))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = CatalogClient::from_config(&Config::new("secret", server.uri())).unwrap();

    let first = catalog.get_popular_movies(DEFAULT_PAGE).await.unwrap();
    let second = catalog.get_popular_movies(DEFAULT_PAGE).await.unwrap();

    assert_eq!(first.page, 1);
    assert_eq!(first.total_pages, 500);
    assert_eq!(first.total_results, 10000);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_cache_expires_after_ten_minutes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(200).set_body_json(popular_body()))
        .expect(2)
        .mount(&server)
        .await;

    let clock = ManualClock::new();
    let config = Config::new("secret", server.uri());
    let cache = ResponseCache::with_clock(config.cache_ttl, Arc::new(clock.clone()));
    let catalog = CatalogClient::new(CachedFetcher::new(&config, cache).unwrap());

    catalog.get_popular_movies(DEFAULT_PAGE).await.unwrap();
    clock.advance(Duration::from_secs(5 * 60));
    catalog.get_popular_movies(DEFAULT_PAGE).await.unwrap();
    clock.advance(CACHE_DURATION);
    catalog.get_popular_movies(DEFAULT_PAGE).await.unwrap();
}
