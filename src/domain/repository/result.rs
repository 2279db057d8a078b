use serde::Serialize;
use serde_json::Value;

use crate::domain::analytics::Dto;

/// Outcome of a repository call, rebuilt on every call
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryResult<D> {
    /// URL the payload was originally fetched from
    pub url: Option<String>,
    pub data: D,
    pub from_cache: bool,
    /// Hours since the payload was fetched, only for cache hits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_age_hours: Option<f64>,
    /// Response body as received
    pub raw: Value,
}

impl<D: Dto> RepositoryResult<D> {
    pub fn fresh(url: impl Into<String>, raw: Value) -> Self {
        Self {
            url: Some(url.into()),
            data: D::from_json(&raw),
            from_cache: false,
            cache_age_hours: None,
            raw,
        }
    }

    /// Rebuilds a result from a cached `{url, data}` payload
    pub fn cached(payload: &Value, age_hours: f64) -> Self {
        let raw = payload.get("data").cloned().unwrap_or(Value::Null);
        Self {
            url: payload.get("url").and_then(Value::as_str).map(str::to_string),
            data: D::from_json(&raw),
            from_cache: true,
            cache_age_hours: Some(age_hours),
            raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analytics::SearchResults;
    use serde_json::json;

    #[test]
    fn test_cached_payload() {
        let payload = json!({"url": "https://api/x", "data": {"search_results": [{"asin": "B1"}]}});
        let result = RepositoryResult::<SearchResults>::cached(&payload, 2.5);

        assert!(result.from_cache);
        assert_eq!(result.url.as_deref(), Some("https://api/x"));
        assert_eq!(result.cache_age_hours, Some(2.5));
        assert_eq!(result.data.search_results.len(), 1);
        assert_eq!(result.raw, payload["data"]);
    }

    #[test]
    fn test_cached_payload_with_unexpected_shape() {
        let result = RepositoryResult::<SearchResults>::cached(&json!("legacy"), 0.0);

        assert!(result.url.is_none());
        assert_eq!(result.raw, Value::Null);
        assert!(result.data.search_results.is_empty());
    }

    #[test]
    fn test_fresh_serializes_without_age() {
        let result = RepositoryResult::<SearchResults>::fresh("u", json!([]));
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["from_cache"], json!(false));
        assert!(value.get("cache_age_hours").is_none());
    }
}
