//! Remote endpoint description and fetcher trait

use std::fmt::Debug;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::DomainError;

/// A GET request against the analytics API, independent of transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Endpoint identifier, also the cache key namespace
    pub api_name: String,
    /// Path below the API base URL
    pub path: String,
    /// Query parameters in send order
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(api_name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_optional_param(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.with_param(key, value),
            None => self,
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// What a fetch returns, and what the cache stores for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteResponse {
    pub url: String,
    pub data: Value,
}

/// Fetches one endpoint response from the analytics API
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RemoteFetcher: Send + Sync + Debug {
    async fn fetch(&self, request: &ApiRequest) -> Result<RemoteResponse, DomainError>;
}

/// A response DTO that can be built from any JSON value
pub trait Dto: Serialize + Debug + Clone + Send + Sync + 'static {
    /// Never fails; unexpected shapes yield defaults and unknown keys are kept
    fn from_json(value: &Value) -> Self;
}

/// Per-endpoint variation for the cached repository
pub trait Endpoint: Send + Sync + 'static {
    /// Endpoint identifier used in cache keys and logs
    const API_NAME: &'static str;

    /// Call parameters; their serialized form is the cache key material
    type Params: Serialize + Debug + Send + Sync;

    type Dto: Dto;

    fn request(params: &Self::Params) -> ApiRequest;
}
