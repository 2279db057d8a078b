//! Cache-first repository over a remote endpoint

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::analytics::{ApiRequest, Endpoint, RemoteFetcher, RemoteResponse};
use crate::domain::cache::{CacheKeyGenerator, CacheKeyParams, CacheStore};
use crate::domain::DomainError;

use super::result::RepositoryResult;
use super::retry::RetryConfig;

/// Repository for one endpoint: cache lookup first, remote fetch on miss.
///
/// Successful fetches are stored as `{url, data}` under a key derived only
/// from the endpoint name and the call parameters. Failed fetches are never
/// cached.
pub struct CachedRepository<E: Endpoint> {
    cache: Arc<dyn CacheStore>,
    fetcher: Arc<dyn RemoteFetcher>,
    key_generator: Arc<dyn CacheKeyGenerator>,
    retry: RetryConfig,
    _endpoint: PhantomData<fn() -> E>,
}

impl<E: Endpoint> fmt::Debug for CachedRepository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedRepository")
            .field("api", &E::API_NAME)
            .field("cache", &self.cache)
            .field("fetcher", &self.fetcher)
            .field("retry", &self.retry)
            .finish()
    }
}

impl<E: Endpoint> Clone for CachedRepository<E> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            fetcher: self.fetcher.clone(),
            key_generator: self.key_generator.clone(),
            retry: self.retry.clone(),
            _endpoint: PhantomData,
        }
    }
}

impl<E: Endpoint> CachedRepository<E> {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        fetcher: Arc<dyn RemoteFetcher>,
        key_generator: Arc<dyn CacheKeyGenerator>,
    ) -> Self {
        Self {
            cache,
            fetcher,
            key_generator,
            retry: RetryConfig::default(),
            _endpoint: PhantomData,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn api_name(&self) -> &'static str {
        E::API_NAME
    }

    /// Cache key for the given parameters
    pub fn cache_key(&self, params: &E::Params) -> Result<String, DomainError> {
        let key_params = CacheKeyParams::from_serializable(E::API_NAME, params).map_err(|e| {
            DomainError::internal(format!(
                "Failed to serialize {} parameters: {}",
                E::API_NAME,
                e
            ))
        })?;

        Ok(self.key_generator.generate(&key_params))
    }

    pub async fn get(&self, params: &E::Params) -> Result<RepositoryResult<E::Dto>, DomainError> {
        let key = self.cache_key(params)?;

        if let Some(hit) = self.cache.get(&key).await? {
            debug!(
                api = E::API_NAME,
                key = %key,
                age_hours = hit.age_hours,
                "Cache hit"
            );
            return Ok(RepositoryResult::cached(&hit.payload, hit.age_hours));
        }

        debug!(api = E::API_NAME, key = %key, "Cache miss, fetching from API");

        let response = self.fetch_with_retry(&E::request(params)).await?;
        let payload = serde_json::to_value(&response).map_err(|e| {
            DomainError::internal(format!("Failed to serialize {} response: {}", E::API_NAME, e))
        })?;
        self.cache.set(&key, payload).await?;

        debug!(api = E::API_NAME, key = %key, "API call successful, cached");

        Ok(RepositoryResult::fresh(response.url, response.data))
    }

    async fn fetch_with_retry(&self, request: &ApiRequest) -> Result<RemoteResponse, DomainError> {
        let mut attempt = 0u32;

        loop {
            match self.fetcher.fetch(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        api = E::API_NAME,
                        attempt = attempt + 1,
                        max_retries = self.retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient fetch failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
