use std::fmt;

use serde::Deserialize;

use crate::domain::repository::RetryConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub cache: CacheSettings,
    pub retry: RetryConfig,
    pub flow: FlowSettings,
    pub logging: LoggingConfig,
}

/// Analytics API access
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub client_id: String,
    pub token: String,
    pub timeout_secs: u64,
    /// Marketplace code sent with every request
    pub geo: String,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .field("timeout_secs", &self.timeout_secs)
            .field("geo", &self.geo)
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.sellerapp.com".to_string(),
            client_id: String::new(),
            token: String::new(),
            timeout_secs: 30,
            geo: "us".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.token.is_empty()
    }
}

/// Response cache backend and key scheme
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// in_memory, file or redis
    pub storage_type: String,
    pub file_path: String,
    pub redis_url: Option<String>,
    pub key_prefix: Option<String>,
    pub max_capacity: u64,
    /// canonical or legacy
    pub key_scheme: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            storage_type: "file".to_string(),
            file_path: ".asin-insights/storage.json".to_string(),
            redis_url: None,
            key_prefix: None,
            max_capacity: 10_000,
            key_scheme: "canonical".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlowSettings {
    pub competitor_limit: usize,
    pub competitor_concurrency: usize,
    pub history_days: u32,
    /// Keep the latest product flow under the `flow*` storage keys
    pub record_last_run: bool,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            competitor_limit: 10,
            competitor_concurrency: 4,
            history_days: 30,
            record_last_run: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::from_builder(
            config::Config::builder()
                .add_source(config::File::with_name("config/default").required(false))
                .add_source(config::File::with_name("config/local").required(false))
                .add_source(
                    config::Environment::with_prefix("APP")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        builder.build()?.try_deserialize()
    }
}
