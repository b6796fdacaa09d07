use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::cache::{Params, ResponseCache};
use crate::config::Config;
use crate::error::Result;
use crate::fetch::CachedFetcher;
use crate::models::{Genre, GenreList, MovieDetails, MoviePage};

pub const DEFAULT_PAGE: u32 = 1;

/// Typed access to the movie catalog. Every call is one cached fetch.
#[derive(Clone)]
pub struct CatalogClient {
    fetcher: CachedFetcher,
}

impl CatalogClient {
    pub fn new(fetcher: CachedFetcher) -> Self {
        Self { fetcher }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = ResponseCache::new(config.cache_ttl);
        Ok(Self::new(CachedFetcher::new(config, cache)?))
    }

    pub fn fetcher(&self) -> &CachedFetcher {
        &self.fetcher
    }

    pub async fn get_popular_movies(&self, page: u32) -> Result<MoviePage> {
        debug!("Getting popular movies, page {}", page);
        self.fetch("/movie/popular", json!({ "page": page })).await
    }

    pub async fn search_movies(&self, query: &str, page: u32) -> Result<MoviePage> {
        debug!("Searching movies with query: {}", query);
        self.fetch("/search/movie", json!({ "query": query, "page": page }))
            .await
    }

    pub async fn get_movie_details(&self, movie_id: i64) -> Result<MovieDetails> {
        debug!("Getting details for movie {}", movie_id);
        self.fetch(
            &format!("/movie/{}", movie_id),
            json!({ "append_to_response": "videos,credits" }),
        )
        .await
    }

    /// Returns the genre array, not the `{"genres": [...]}` envelope.
    pub async fn get_genres(&self) -> Result<Vec<Genre>> {
        debug!("Getting all genres");
        let list: GenreList = self.fetch("/genre/movie/list", json!({})).await?;
        Ok(list.genres)
    }

    pub async fn get_movies_by_genre(&self, genre_id: i64, page: u32) -> Result<MoviePage> {
        debug!("Getting movies for genre {}, page {}", genre_id, page);
        self.fetch(
            "/discover/movie",
            json!({ "with_genres": genre_id, "page": page }),
        )
        .await
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: &str, params: Value) -> Result<T> {
        let params = match params {
            Value::Object(map) => map,
            _ => Params::new(),
        };
        let payload = self.fetcher.fetch_with_cache(endpoint, &params).await?;
        Ok(serde_json::from_value(payload)?)
    }
}
