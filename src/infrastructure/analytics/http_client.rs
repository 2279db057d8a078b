use std::time::Duration;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    /// Sends a GET. Only transport failures are errors; any status is returned.
    async fn get(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<HttpResponse, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn get(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<HttpResponse, DomainError> {
        let mut request = self.client.get(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::remote_fetch("http", format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::remote_fetch("http", format!("Failed to read body: {}", e)))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// Answers by exact URL and records every request it sees
    #[derive(Debug, Default)]
    pub struct MockHttpClient {
        responses: RwLock<HashMap<String, HttpResponse>>,
        errors: RwLock<HashMap<String, String>>,
        requests: RwLock<Vec<(String, Vec<(String, String)>)>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, url: impl Into<String>, response: HttpResponse) -> Self {
            self.responses.write().unwrap().insert(url.into(), response);
            self
        }

        pub fn with_json(self, url: impl Into<String>, body: serde_json::Value) -> Self {
            self.with_response(url, HttpResponse::new(200, body.to_string()))
        }

        pub fn with_error(self, url: impl Into<String>, error: impl Into<String>) -> Self {
            self.errors.write().unwrap().insert(url.into(), error.into());
            self
        }

        pub fn requests(&self) -> Vec<(String, Vec<(String, String)>)> {
            self.requests.read().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn get(
            &self,
            url: &str,
            headers: Vec<(&str, &str)>,
        ) -> Result<HttpResponse, DomainError> {
            self.requests.write().unwrap().push((
                url.to_string(),
                headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ));

            if let Some(error) = self.errors.read().unwrap().get(url) {
                return Err(DomainError::remote_fetch("mock", error.clone()));
            }

            self.responses
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| {
                    DomainError::remote_fetch("mock", format!("No mock response for {}", url))
                })
        }
    }
}
