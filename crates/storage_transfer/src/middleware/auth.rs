//! API-key check for the HTTP trigger routes
//!
//! The original function host gated its HTTP trigger behind a function key;
//! here that maps to an optional `X-API-Key` header check applied at the
//! route level, plus a small per-key rate limit.

use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;

use crate::config::AuthConfig;
use crate::models::error::TransferError;

#[derive(Clone)]
pub struct AuthState {
    pub api_keys: Arc<HashSet<String>>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AuthState {
    /// Builds the auth state from configuration; keys from `api_key_file`
    /// (one per line) are merged with inline keys.
    pub async fn from_config(config: &AuthConfig) -> Result<Self, TransferError> {
        let mut api_keys: HashSet<String> = config.api_keys.iter().cloned().collect();

        if let Some(path) = &config.api_key_file {
            let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
                TransferError::ConfigError(format!("failed to read api key file: {}", e))
            })?;
            api_keys.extend(
                contents
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string),
            );
        }

        Ok(Self {
            api_keys: Arc::new(api_keys),
            rate_limiter: Arc::new(RateLimiter::new(config.rate_limit_per_minute)),
        })
    }
}

pub struct RateLimiter {
    requests: Arc<RwLock<lru::LruCache<String, Vec<Instant>>>>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit_per_minute: u32) -> Self {
        Self {
            requests: Arc::new(RwLock::new(lru::LruCache::unbounded())),
            limit: limit_per_minute,
            window: Duration::from_secs(60),
        }
    }

    pub async fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut cache = self.requests.write().await;

        if let Some(requests) = cache.get_mut(key) {
            requests.retain(|&time| now.duration_since(time) < self.window);

            if requests.len() >= self.limit as usize {
                return false;
            }

            requests.push(now);
        } else {
            cache.put(key.to_string(), vec![now]);
        }

        true
    }
}
