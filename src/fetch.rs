use dashmap::DashMap;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{Params, ResponseCache};
use crate::config::Config;
use crate::error::{AppError, Result};

/// GET wrapper over the catalog that answers repeated requests from a
/// [`ResponseCache`].
#[derive(Clone)]
pub struct CachedFetcher {
    client: Client,
    base_url: String,
    default_query: Vec<(String, String)>,
    cache: ResponseCache,
    in_flight: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl CachedFetcher {
    pub fn new(config: &Config, cache: ResponseCache) -> Result<Self> {
        let mut builder = Client::builder().user_agent("Lupe-Discover/1.0");
        if let Some(timeout) = config.api_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            default_query: vec![
                ("api_key".to_string(), config.api_key.clone()),
                ("language".to_string(), config.language.clone()),
            ],
            cache,
            in_flight: Arc::new(DashMap::new()),
        })
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Returns the cached payload for `(endpoint, params)` while it is fresh,
    /// otherwise fetches it and replaces the cache entry. Errors are returned
    /// as-is and leave the cache untouched.
    pub async fn fetch_with_cache(&self, endpoint: &str, params: &Params) -> Result<Value> {
        let key = ResponseCache::key(endpoint, params);

        if let Some(payload) = self.cache.get(&key) {
            debug!("Cache hit: {}", key);
            return Ok(payload);
        }

        // One request per key at a time; later callers pick up the fresh entry.
        let lock = self
            .in_flight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock().await;
            match self.cache.get(&key) {
                Some(payload) => {
                    debug!("Cache hit after wait: {}", key);
                    Ok(payload)
                }
                None => {
                    debug!("Cache miss: {}", key);
                    let fetched = self.get_json(endpoint, params).await;
                    if let Ok(payload) = &fetched {
                        self.cache.insert(key.clone(), payload.clone());
                    }
                    fetched
                }
            }
        };

        // Only the map and this call still hold the lock: nobody is waiting on it.
        self.in_flight
            .remove_if(&key, |_, entry| Arc::strong_count(entry) == 2);

        result
    }

    async fn get_json(&self, endpoint: &str, params: &Params) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {}", url);

        let query: Vec<(String, String)> = self
            .default_query
            .iter()
            .cloned()
            .chain(params.iter().map(|(k, v)| (k.clone(), query_value(v))))
            .collect();

        let response = self.client.get(&url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::TransportError { status, body });
        }

        let payload: Value = response.json().await?;
        Ok(payload)
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
