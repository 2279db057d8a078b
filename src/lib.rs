//! ASIN Insights
//!
//! Seller analytics for Amazon products:
//! - Cache-first access to the SellerApp analytics endpoints
//! - Pluggable cache storage (memory, JSON file, Redis) with a 24 hour TTL
//! - Competitor selection by title similarity and price proximity
//! - Product and category dashboard flows

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use domain::cache::{CacheStore, SystemClock};
use domain::competitor::ScorerConfig;
use domain::DomainError;
use infrastructure::{
    analytics::{HttpClient, SellerAppFetcher},
    cache::{CacheConfig, CacheFactory, KeyScheme},
    services::{AnalyticsRepositories, DashboardConfig, DashboardService},
    storage::{StorageConfig, StorageFactory, StorageType},
};
use tracing::{info, warn};

/// Everything a command needs, wired from configuration
#[derive(Debug)]
pub struct Services {
    pub dashboard: DashboardService,
    pub cache: Arc<dyn CacheStore>,
    pub fetcher: Arc<SellerAppFetcher<HttpClient>>,
}

/// Builds the storage settings for the configured cache backend
pub fn storage_config(config: &AppConfig) -> Result<StorageConfig, DomainError> {
    let settings = &config.cache;
    let storage_type: StorageType = settings.storage_type.parse()?;

    let mut storage = StorageConfig {
        storage_type,
        redis_url: settings.redis_url.clone(),
        ..StorageConfig::file(&settings.file_path)
    }
    .with_max_capacity(settings.max_capacity);

    if let Some(prefix) = &settings.key_prefix {
        storage = storage.with_key_prefix(prefix.clone());
    }

    Ok(storage)
}

/// Opens the cache backend only
pub async fn create_cache(config: &AppConfig) -> anyhow::Result<Arc<dyn CacheStore>> {
    let cache_config = CacheConfig::new(storage_config(config)?);
    Ok(CacheFactory::new()
        .create(&cache_config, Arc::new(SystemClock))
        .await?)
}

/// Creates the dashboard service and its collaborators
pub async fn create_services(config: &AppConfig) -> anyhow::Result<Services> {
    let storage_config = storage_config(config)?;
    let key_scheme: KeyScheme = config.cache.key_scheme.parse()?;
    let cache_config = CacheConfig::new(storage_config.clone()).with_key_scheme(key_scheme);

    info!(
        storage = %storage_config.storage_type,
        key_scheme = %key_scheme,
        "Opening cache storage"
    );
    let storage = StorageFactory::new().create(&storage_config).await?;
    let factory = CacheFactory::new();
    let cache = factory.with_storage(&cache_config, storage.clone(), Arc::new(SystemClock));

    if !config.api.has_credentials() {
        warn!("API client id or token is not configured; remote calls will be rejected");
    }
    let http = HttpClient::with_timeout(Duration::from_secs(config.api.timeout_secs))?;
    let fetcher = Arc::new(SellerAppFetcher::with_base_url(
        http,
        &config.api.client_id,
        &config.api.token,
        &config.api.base_url,
    ));

    let repositories =
        AnalyticsRepositories::new(cache.clone(), fetcher.clone(), factory.key_generator(key_scheme))
            .with_retry(config.retry.clone());

    let dashboard_config = DashboardConfig::default()
        .with_geo(&config.api.geo)
        .with_history_days(config.flow.history_days)
        .with_competitor_concurrency(config.flow.competitor_concurrency)
        .with_scorer(ScorerConfig::default().with_limit(config.flow.competitor_limit));

    let mut dashboard = DashboardService::new(repositories, dashboard_config);
    if config.flow.record_last_run {
        dashboard = dashboard.with_last_run_storage(storage);
    }

    Ok(Services {
        dashboard,
        cache,
        fetcher,
    })
}
