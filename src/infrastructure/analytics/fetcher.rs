use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

use super::http_client::{HttpClientTrait, HttpResponse};
use crate::domain::analytics::{ApiRequest, RemoteFetcher, RemoteResponse};
use crate::domain::DomainError;

pub const DEFAULT_SELLERAPP_BASE_URL: &str = "https://api.sellerapp.com";

/// ASIN used for the credential check request
const PROBE_ASIN: &str = "B086KY66PJ";

/// Outcome of a credential check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    Valid,
    Expired,
    Invalid,
    AuthenticationFailed,
    UnexpectedStatus(u16),
}

impl TokenStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn message(&self) -> String {
        match self {
            Self::Valid => "Token is valid".to_string(),
            Self::Expired => "Token is expired".to_string(),
            Self::Invalid => "Token is invalid".to_string(),
            Self::AuthenticationFailed => "Authentication failed - check credentials".to_string(),
            Self::UnexpectedStatus(status) => format!("API returned status {}", status),
        }
    }
}

/// SellerApp `sellmetricsv2` fetcher
#[derive(Debug)]
pub struct SellerAppFetcher<C: HttpClientTrait> {
    client: C,
    client_id: String,
    token: String,
    base_url: String,
}

impl<C: HttpClientTrait> SellerAppFetcher<C> {
    pub fn new(client: C, client_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_base_url(client, client_id, token, DEFAULT_SELLERAPP_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        client_id: impl Into<String>,
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            client_id: client_id.into(),
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("client-id", self.client_id.as_str()),
            ("token", self.token.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_url(&self, request: &ApiRequest) -> Result<Url, DomainError> {
        Url::parse_with_params(&format!("{}{}", self.base_url, request.path), &request.query)
            .map_err(|e| {
                DomainError::configuration(format!(
                    "Invalid URL for {}: {}",
                    request.api_name, e
                ))
            })
    }

    /// Probes the product details endpoint with a known ASIN
    pub async fn verify_credentials(&self) -> Result<TokenStatus, DomainError> {
        let probe = ApiRequest::new("tokenCheck", "/sellmetricsv2/products")
            .with_param("product_specifications", 1)
            .with_param("geo", "us")
            .with_param("productIds", PROBE_ASIN);
        let url = self.build_url(&probe)?;

        let response = self.client.get(url.as_str(), self.headers()).await?;
        if response.is_success() {
            return Ok(TokenStatus::Valid);
        }

        if response.status != 401 {
            return Ok(TokenStatus::UnexpectedStatus(response.status));
        }

        let error = error_field(&response.body).unwrap_or_default();
        Ok(if error.contains("expired") {
            TokenStatus::Expired
        } else if error.contains("invalid") {
            TokenStatus::Invalid
        } else {
            TokenStatus::AuthenticationFailed
        })
    }
}

#[async_trait]
impl<C: HttpClientTrait> RemoteFetcher for SellerAppFetcher<C> {
    async fn fetch(&self, request: &ApiRequest) -> Result<RemoteResponse, DomainError> {
        let url = self.build_url(request)?;
        debug!(api = %request.api_name, url = %url, "Fetching from analytics API");

        let response = self.client.get(url.as_str(), self.headers()).await.map_err(|e| match e {
            DomainError::RemoteFetch { message, .. } => {
                DomainError::remote_fetch(&request.api_name, message)
            }
            other => other,
        })?;

        if !response.is_success() {
            warn!(api = %request.api_name, status = response.status, "Analytics API request failed");
            return Err(DomainError::remote_status(
                &request.api_name,
                response.status,
                failure_message(&response),
            ));
        }

        // A body that fails to decode fails the same way on every attempt
        let data: Value = serde_json::from_str(&response.body).map_err(|e| {
            DomainError::remote_status(
                &request.api_name,
                response.status,
                format!("Failed to parse response: {}", e),
            )
        })?;

        Ok(RemoteResponse {
            url: url.to_string(),
            data,
        })
    }
}

fn error_field(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("error")?
        .as_str()
        .map(str::to_string)
}

fn failure_message(response: &HttpResponse) -> String {
    let reason = StatusCode::from_u16(response.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("");
    let head = format!("{} {}", response.status, reason);
    let head = head.trim_end();

    match error_field(&response.body) {
        Some(error) if error.to_lowercase().contains("expired") => {
            format!("{}; token expired: {}. Get a new token from SellerApp", head, error)
        }
        Some(error) if error.to_lowercase().contains("invalid") => {
            format!(
                "{}; invalid credentials: {}. Check the configured client id and token",
                head, error
            )
        }
        _ => format!("{}; response: {}", head, response.body),
    }
}
