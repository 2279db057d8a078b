//! Dashboard flows: competitor analysis for a product and category overview

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::domain::analytics::{
    CategoryProducts, CategoryProductsParams, KeywordResearch, KeywordSearchParams,
    KeywordSummary, ProductDetails, ProductDetailsParams, ProductHistory, ProductHistoryParams,
    ProductSummary, RemoteFetcher, ReverseAsinKeywordsParams, SearchResults,
    DEFAULT_HISTORY_DAYS,
};
use crate::domain::cache::{CacheKeyGenerator, CacheStore};
use crate::domain::competitor::{
    deepest_category_id, pick_search_term, Candidate, CompetitorScorer, PageProduct,
    ReferenceProduct, ScoredCandidate, ScorerConfig,
};
use crate::domain::repository::{RepositoryResult, RetryConfig};
use crate::domain::storage::KeyValueStorage;
use crate::domain::DomainError;
use crate::infrastructure::analytics::{
    CategoryProductsRepository, KeywordSearchRepository, ProductDetailsRepository,
    ProductHistoryRepository, ReverseAsinKeywordsRepository,
};

/// Storage keys of the most recent product flow
pub const LAST_RUN_ASIN_KEY: &str = "flowASIN";
pub const LAST_RUN_PRODUCT_KEY: &str = "flowProductInfo";
pub const LAST_RUN_RESULTS_KEY: &str = "flowApiResults";

/// One repository per analytics endpoint, all sharing a cache and fetcher
#[derive(Debug, Clone)]
pub struct AnalyticsRepositories {
    pub details: ProductDetailsRepository,
    pub history: ProductHistoryRepository,
    pub keywords: ReverseAsinKeywordsRepository,
    pub search: KeywordSearchRepository,
    pub category_products: CategoryProductsRepository,
}

impl AnalyticsRepositories {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        fetcher: Arc<dyn RemoteFetcher>,
        key_generator: Arc<dyn CacheKeyGenerator>,
    ) -> Self {
        Self {
            details: ProductDetailsRepository::new(
                cache.clone(),
                fetcher.clone(),
                key_generator.clone(),
            ),
            history: ProductHistoryRepository::new(
                cache.clone(),
                fetcher.clone(),
                key_generator.clone(),
            ),
            keywords: ReverseAsinKeywordsRepository::new(
                cache.clone(),
                fetcher.clone(),
                key_generator.clone(),
            ),
            search: KeywordSearchRepository::new(
                cache.clone(),
                fetcher.clone(),
                key_generator.clone(),
            ),
            category_products: CategoryProductsRepository::new(cache, fetcher, key_generator),
        }
    }

    pub fn with_retry(self, retry: RetryConfig) -> Self {
        Self {
            details: self.details.with_retry(retry.clone()),
            history: self.history.with_retry(retry.clone()),
            keywords: self.keywords.with_retry(retry.clone()),
            search: self.search.with_retry(retry.clone()),
            category_products: self.category_products.with_retry(retry),
        }
    }
}

/// Steps reported while a flow runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStep {
    ProductDetails,
    ProductHistory,
    ReverseKeywords,
    KeywordSearch,
    CategoryProducts,
    RefreshDetails,
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowStep::ProductDetails => write!(f, "product_details"),
            FlowStep::ProductHistory => write!(f, "product_history"),
            FlowStep::ReverseKeywords => write!(f, "reverse_keywords"),
            FlowStep::KeywordSearch => write!(f, "keyword_search"),
            FlowStep::CategoryProducts => write!(f, "category_products"),
            FlowStep::RefreshDetails => write!(f, "refresh_details"),
        }
    }
}

/// Receives incremental progress as a flow advances
pub trait ProgressReporter: Send + Sync + fmt::Debug {
    fn step_completed(&self, step: FlowStep, from_cache: bool);

    fn step_skipped(&self, step: FlowStep, reason: &str);

    /// Called in rank order, once per competitor
    fn competitor_finished(&self, done: usize, total: usize, outcome: &CompetitorOutcome);
}

/// Reports progress as log events
#[derive(Debug, Default)]
pub struct TracingProgressReporter;

impl ProgressReporter for TracingProgressReporter {
    fn step_completed(&self, step: FlowStep, from_cache: bool) {
        info!(step = %step, from_cache, "Flow step completed");
    }

    fn step_skipped(&self, step: FlowStep, reason: &str) {
        warn!(step = %step, reason, "Flow step skipped");
    }

    fn competitor_finished(&self, done: usize, total: usize, outcome: &CompetitorOutcome) {
        match &outcome.error {
            None => info!(
                asin = %outcome.asin(),
                done,
                total,
                from_cache = outcome.details.as_ref().is_some_and(|d| d.from_cache),
                "Competitor details loaded"
            ),
            Some(error) => warn!(
                asin = %outcome.asin(),
                done,
                total,
                error = %error,
                "Competitor details failed"
            ),
        }
    }
}

/// A ranked competitor with its details, or the error that prevented loading them
#[derive(Debug, Clone, Serialize)]
pub struct CompetitorOutcome {
    #[serde(flatten)]
    pub scored: ScoredCandidate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<RepositoryResult<ProductDetails>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CompetitorOutcome {
    pub fn asin(&self) -> &str {
        &self.scored.candidate.asin
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductDashboard {
    pub flow_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub asin: String,
    pub reference: ReferenceProduct,
    /// Phrase sent to keyword search; the ASIN when the title gave nothing
    pub search_term: String,
    pub summary: ProductSummary,
    pub keyword_summary: KeywordSummary,
    pub details: RepositoryResult<ProductDetails>,
    pub history: RepositoryResult<ProductHistory>,
    pub keywords: RepositoryResult<KeywordResearch>,
    pub search: RepositoryResult<SearchResults>,
    pub competitors: Vec<CompetitorOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryDashboard {
    pub flow_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub asin: String,
    pub summary: ProductSummary,
    pub details: RepositoryResult<ProductDetails>,
    pub history: RepositoryResult<ProductHistory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_products: Option<RepositoryResult<CategoryProducts>>,
    pub refreshed_details: RepositoryResult<ProductDetails>,
}

/// Flow settings
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Marketplace code sent to every endpoint
    pub geo: String,
    pub history_days: u32,
    /// Competitor detail requests in flight at once
    pub competitor_concurrency: usize,
    pub scorer: ScorerConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            geo: "us".to_string(),
            history_days: DEFAULT_HISTORY_DAYS,
            competitor_concurrency: 4,
            scorer: ScorerConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn with_geo(mut self, geo: impl Into<String>) -> Self {
        self.geo = geo.into();
        self
    }

    pub fn with_history_days(mut self, days: u32) -> Self {
        self.history_days = days;
        self
    }

    pub fn with_competitor_concurrency(mut self, concurrency: usize) -> Self {
        self.competitor_concurrency = concurrency;
        self
    }

    pub fn with_scorer(mut self, scorer: ScorerConfig) -> Self {
        self.scorer = scorer;
        self
    }
}

/// Runs the dashboard flows against the cached repositories
#[derive(Debug)]
pub struct DashboardService {
    repositories: AnalyticsRepositories,
    scorer: CompetitorScorer,
    config: DashboardConfig,
    reporter: Arc<dyn ProgressReporter>,
    last_run: Option<Arc<dyn KeyValueStorage>>,
}

impl DashboardService {
    pub fn new(repositories: AnalyticsRepositories, config: DashboardConfig) -> Self {
        Self {
            repositories,
            scorer: CompetitorScorer::new(config.scorer.clone()),
            config,
            reporter: Arc::new(TracingProgressReporter),
            last_run: None,
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Records each finished product flow under the `flow*` keys
    pub fn with_last_run_storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.last_run = Some(storage);
        self
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Details, history and keywords for the product, then competitors found
    /// through keyword search, ranked and enriched with their own details.
    ///
    /// A failed step aborts the flow. Failed competitors do not.
    pub async fn run_product_flow(
        &self,
        page: PageProduct,
    ) -> Result<ProductDashboard, DomainError> {
        let asin = required_asin(page.asin.as_deref())?;
        let flow_id = Uuid::new_v4();
        let span = info_span!("product_flow", %flow_id, asin = %asin);

        self.product_flow(flow_id, asin, page).instrument(span).await
    }

    /// Details and history for the product, then the best sellers of its most
    /// specific category when it has one.
    pub async fn run_category_flow(&self, asin: &str) -> Result<CategoryDashboard, DomainError> {
        let asin = required_asin(Some(asin))?;
        let flow_id = Uuid::new_v4();
        let span = info_span!("category_flow", %flow_id, asin = %asin);

        self.category_flow(flow_id, asin).instrument(span).await
    }

    async fn product_flow(
        &self,
        flow_id: Uuid,
        asin: String,
        page: PageProduct,
    ) -> Result<ProductDashboard, DomainError> {
        let geo = self.config.geo.as_str();
        info!("Starting product flow");

        let details = self.load_details(&asin, FlowStep::ProductDetails).await?;
        let history = self.load_history(&asin).await?;

        let keywords = self
            .repositories
            .keywords
            .get(&ReverseAsinKeywordsParams::new(&asin, geo))
            .await?;
        self.reporter
            .step_completed(FlowStep::ReverseKeywords, keywords.from_cache);

        let mut reference = ReferenceProduct::resolve(&page, &details.data);
        reference.asin = Some(asin.clone());

        let search_term = match pick_search_term(&reference.title) {
            term if term.is_empty() => asin.clone(),
            term => term,
        };
        let search = self
            .repositories
            .search
            .get(&KeywordSearchParams::new(&search_term, geo).with_sponsored(true))
            .await?;
        self.reporter
            .step_completed(FlowStep::KeywordSearch, search.from_cache);

        let candidates = Candidate::from_search_results(&search.data.search_results);
        let ranked = self.scorer.select(&reference, candidates);
        info!(
            search_term = %search_term,
            competitors = ranked.len(),
            "Competitors selected"
        );

        let competitors = self.enrich_competitors(ranked).await;

        let dashboard = ProductDashboard {
            flow_id,
            generated_at: Utc::now(),
            summary: ProductSummary::from_details(&details.data),
            keyword_summary: KeywordSummary::from_research(&keywords.data),
            asin,
            reference,
            search_term,
            details,
            history,
            keywords,
            search,
            competitors,
        };

        self.record_last_run(&page, &dashboard).await;
        Ok(dashboard)
    }

    async fn category_flow(
        &self,
        flow_id: Uuid,
        asin: String,
    ) -> Result<CategoryDashboard, DomainError> {
        info!("Starting category flow");

        let details = self.load_details(&asin, FlowStep::ProductDetails).await?;
        let history = self.load_history(&asin).await?;

        let category_id = deepest_category_id(&details.data);
        let category_products = match &category_id {
            Some(id) => {
                let products = self
                    .repositories
                    .category_products
                    .get(&CategoryProductsParams::new(id, &self.config.geo))
                    .await?;
                self.reporter
                    .step_completed(FlowStep::CategoryProducts, products.from_cache);
                Some(products)
            }
            None => {
                self.reporter
                    .step_skipped(FlowStep::CategoryProducts, "product has no category node");
                None
            }
        };

        let refreshed_details = self.load_details(&asin, FlowStep::RefreshDetails).await?;

        Ok(CategoryDashboard {
            flow_id,
            generated_at: Utc::now(),
            summary: ProductSummary::from_details(&details.data),
            asin,
            details,
            history,
            category_id,
            category_products,
            refreshed_details,
        })
    }

    async fn load_details(
        &self,
        asin: &str,
        step: FlowStep,
    ) -> Result<RepositoryResult<ProductDetails>, DomainError> {
        let details = self
            .repositories
            .details
            .get(&ProductDetailsParams::new(asin, &self.config.geo))
            .await?;
        self.reporter.step_completed(step, details.from_cache);
        Ok(details)
    }

    async fn load_history(
        &self,
        asin: &str,
    ) -> Result<RepositoryResult<ProductHistory>, DomainError> {
        let params = ProductHistoryParams::new(asin, &self.config.geo)
            .with_days(self.config.history_days);
        let history = self.repositories.history.get(&params).await?;
        self.reporter
            .step_completed(FlowStep::ProductHistory, history.from_cache);
        Ok(history)
    }

    /// Loads details for each competitor with bounded concurrency. Outcomes
    /// keep rank order and each failure stays with its own competitor.
    pub async fn enrich_competitors(&self, ranked: Vec<ScoredCandidate>) -> Vec<CompetitorOutcome> {
        let total = ranked.len();
        let repository = &self.repositories.details;
        let geo = self.config.geo.as_str();

        let mut pending = stream::iter(ranked)
            .map(|scored| async move {
                let params = ProductDetailsParams::new(&scored.candidate.asin, geo);
                match repository.get(&params).await {
                    Ok(details) => CompetitorOutcome {
                        scored,
                        details: Some(details),
                        error: None,
                    },
                    Err(e) => CompetitorOutcome {
                        scored,
                        details: None,
                        error: Some(e.to_string()),
                    },
                }
            })
            .buffered(self.config.competitor_concurrency.max(1));

        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = pending.next().await {
            self.reporter
                .competitor_finished(outcomes.len() + 1, total, &outcome);
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn record_last_run(&self, page: &PageProduct, dashboard: &ProductDashboard) {
        let Some(storage) = &self.last_run else {
            return;
        };

        let encoded = serde_json::to_value(page).and_then(|product| {
            serde_json::to_value(dashboard).map(|results| (product, results))
        });
        let (product, results) = match encoded {
            Ok(values) => values,
            Err(e) => {
                warn!(error = %e, "Failed to encode last run");
                return;
            }
        };

        let items = HashMap::from([
            (LAST_RUN_ASIN_KEY.to_string(), json!(dashboard.asin)),
            (LAST_RUN_PRODUCT_KEY.to_string(), product),
            (LAST_RUN_RESULTS_KEY.to_string(), results),
        ]);
        if let Err(e) = storage.set(items).await {
            warn!(error = %e, "Failed to record last run");
        }
    }

    /// The results stored by the most recent product flow, if any
    pub async fn last_run(&self) -> Result<Option<Value>, DomainError> {
        match &self.last_run {
            Some(storage) => storage.get_one(LAST_RUN_RESULTS_KEY).await,
            None => Ok(None),
        }
    }
}

fn required_asin(asin: Option<&str>) -> Result<String, DomainError> {
    asin.map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_uppercase)
        .ok_or_else(|| DomainError::validation("An ASIN is required to run a flow"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::domain::analytics::{ApiRequest, RemoteResponse};
    use crate::domain::cache::{CanonicalKeyGenerator, ManualClock};
    use crate::domain::storage::MockStorage;
    use crate::infrastructure::cache::KeyValueCacheStore;

    const REF: &str = "B0REF00001";

    /// Answers by endpoint and primary identifier, recording every request
    #[derive(Debug, Default)]
    struct StubFetcher {
        routes: HashMap<(String, String), Result<Value, u16>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl StubFetcher {
        fn route(mut self, api: &str, id: &str, data: Value) -> Self {
            self.routes.insert((api.to_string(), id.to_string()), Ok(data));
            self
        }

        fn fail(mut self, api: &str, id: &str, status: u16) -> Self {
            self.routes
                .insert((api.to_string(), id.to_string()), Err(status));
            self
        }

        fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn count(&self, api: &str) -> usize {
            self.requests()
                .iter()
                .filter(|r| r.api_name == api)
                .count()
        }
    }

    fn primary_id(request: &ApiRequest) -> String {
        ["productIds", "productId", "key", "search", "category_id"]
            .iter()
            .find_map(|k| request.param(k))
            .unwrap_or_default()
            .to_string()
    }

    #[async_trait]
    impl RemoteFetcher for StubFetcher {
        async fn fetch(&self, request: &ApiRequest) -> Result<RemoteResponse, DomainError> {
            self.requests.lock().unwrap().push(request.clone());
            let id = primary_id(request);

            match self.routes.get(&(request.api_name.clone(), id.clone())) {
                Some(Ok(data)) => Ok(RemoteResponse {
                    url: format!("https://api.test/{}/{}", request.api_name, id),
                    data: data.clone(),
                }),
                Some(Err(status)) => Err(DomainError::remote_status(
                    &request.api_name,
                    *status,
                    format!("{} failure", status),
                )),
                None => Err(DomainError::remote_status(&request.api_name, 404, "no route")),
            }
        }
    }

    #[derive(Debug, Default)]
    struct RecordingReporter {
        events: Mutex<Vec<String>>,
    }

    impl RecordingReporter {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ProgressReporter for RecordingReporter {
        fn step_completed(&self, step: FlowStep, from_cache: bool) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{step}:{}", if from_cache { "cache" } else { "fetch" }));
        }

        fn step_skipped(&self, step: FlowStep, _reason: &str) {
            self.events.lock().unwrap().push(format!("{step}:skipped"));
        }

        fn competitor_finished(&self, done: usize, total: usize, outcome: &CompetitorOutcome) {
            self.events
                .lock()
                .unwrap()
                .push(format!("competitor {done}/{total} {}", outcome.asin()));
        }
    }

    fn details(title: &str, price: f64) -> Value {
        json!([{
            "product_attributes": {
                "title": title,
                "category": [
                    {"node_id": "100", "level": 1},
                    {"node_id": "300", "level": 3}
                ]
            },
            "price_details": {"listing_price_new": price}
        }])
    }

    fn product_fetcher() -> StubFetcher {
        StubFetcher::default()
            .route("productDetails", REF, details("Stainless Steel Water Bottle 32oz", 19.99))
            .route("productHistory", REF, json!({"price_history": [[1, 19.99]]}))
            .route(
                "reverseAsinKeywords",
                REF,
                json!({"keyword_list": [{"keyword": "water bottle", "search_volume": 9000}]}),
            )
            .route(
                "keywordSearchResult",
                "stainless steel water",
                json!({"search_results": [
                    {"asin": REF, "title": "Stainless Steel Water Bottle 32oz", "price": 19.99},
                    {"asin": "B002", "title": "Plastic Lunch Box", "price": 8.99, "is_sponsored": true},
                    {"asin": "B001", "title": "Stainless Steel Water Bottle 32 oz Insulated", "price": "$21.99"}
                ]}),
            )
            .route("productDetails", "B001", details("Insulated Bottle", 21.99))
            .fail("productDetails", "B002", 500)
    }

    struct Harness {
        service: DashboardService,
        fetcher: Arc<StubFetcher>,
        reporter: Arc<RecordingReporter>,
        storage: Arc<MockStorage>,
    }

    fn harness(fetcher: StubFetcher) -> Harness {
        let fetcher = Arc::new(fetcher);
        let reporter = Arc::new(RecordingReporter::default());
        let storage = Arc::new(MockStorage::new());
        let cache = Arc::new(KeyValueCacheStore::new(
            storage.clone(),
            Arc::new(ManualClock::new(1_700_000_000_000)),
        ));
        let repositories =
            AnalyticsRepositories::new(cache, fetcher.clone(), Arc::new(CanonicalKeyGenerator))
                .with_retry(RetryConfig::none());
        let service = DashboardService::new(repositories, DashboardConfig::default())
            .with_reporter(reporter.clone())
            .with_last_run_storage(storage.clone());

        Harness {
            service,
            fetcher,
            reporter,
            storage,
        }
    }

    #[tokio::test]
    async fn test_product_flow_ranks_and_enriches_competitors() {
        let h = harness(product_fetcher());

        let dashboard = h
            .service
            .run_product_flow(PageProduct::for_asin(REF.to_lowercase()))
            .await
            .unwrap();

        assert_eq!(dashboard.asin, REF);
        assert_eq!(dashboard.search_term, "stainless steel water");
        assert_eq!(dashboard.reference.price, Some(19.99));
        assert_eq!(dashboard.keyword_summary.top_keyword.as_deref(), Some("water bottle"));

        let asins: Vec<_> = dashboard.competitors.iter().map(|c| c.asin()).collect();
        assert_eq!(asins, vec!["B001", "B002"]);

        let first = &dashboard.competitors[0];
        assert!(first.is_ok());
        assert!(first.scored.composite_score > 0.6);
        assert_eq!(
            first.details.as_ref().unwrap().data.product_attributes.title.as_deref(),
            Some("Insulated Bottle")
        );

        let second = &dashboard.competitors[1];
        assert!(second.details.is_none());
        assert!(second.error.as_deref().unwrap().contains("500"));

        let apis: Vec<_> = h
            .fetcher
            .requests()
            .iter()
            .take(4)
            .map(|r| r.api_name.clone())
            .collect();
        assert_eq!(
            apis,
            vec!["productDetails", "productHistory", "reverseAsinKeywords", "keywordSearchResult"]
        );
        let search = &h.fetcher.requests()[3];
        assert_eq!(search.param("include_sponsored_results"), Some("1"));
        assert_eq!(search.param("extended_response"), Some("1"));
    }

    #[tokio::test]
    async fn test_product_flow_reports_progress_in_rank_order() {
        let h = harness(product_fetcher());

        h.service
            .run_product_flow(PageProduct::for_asin(REF))
            .await
            .unwrap();

        assert_eq!(
            h.reporter.events(),
            vec![
                "product_details:fetch",
                "product_history:fetch",
                "reverse_keywords:fetch",
                "keyword_search:fetch",
                "competitor 1/2 B001",
                "competitor 2/2 B002",
            ]
        );
    }

    #[tokio::test]
    async fn test_second_run_is_served_from_cache() {
        let h = harness(product_fetcher());

        h.service
            .run_product_flow(PageProduct::for_asin(REF))
            .await
            .unwrap();
        let dashboard = h
            .service
            .run_product_flow(PageProduct::for_asin(REF))
            .await
            .unwrap();

        assert!(dashboard.details.from_cache);
        assert!(dashboard.search.from_cache);
        assert_eq!(h.fetcher.count("keywordSearchResult"), 1);
        // failed fetches are not cached
        assert_eq!(
            h.fetcher
                .requests()
                .iter()
                .filter(|r| r.param("productIds") == Some("B002"))
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_failed_step_aborts_flow() {
        let fetcher = StubFetcher::default()
            .route("productDetails", REF, details("Bottle", 10.0))
            .fail("productHistory", REF, 401);
        let h = harness(fetcher);

        let error = h
            .service
            .run_product_flow(PageProduct::for_asin(REF))
            .await
            .unwrap_err();

        assert!(matches!(error, DomainError::RemoteFetch { status: Some(401), .. }));
        assert_eq!(h.fetcher.count("reverseAsinKeywords"), 0);
        assert_eq!(h.reporter.events(), vec!["product_details:fetch"]);
        assert!(h.storage.raw(LAST_RUN_ASIN_KEY).is_none());
    }

    #[tokio::test]
    async fn test_untitled_product_searches_by_asin() {
        let fetcher = StubFetcher::default()
            .route("productDetails", REF, json!({}))
            .route("productHistory", REF, json!({}))
            .route("reverseAsinKeywords", REF, json!({}))
            .route("keywordSearchResult", REF, json!({"search_results": []}));
        let h = harness(fetcher);

        let dashboard = h
            .service
            .run_product_flow(PageProduct::for_asin(REF))
            .await
            .unwrap();

        assert_eq!(dashboard.search_term, REF);
        assert!(dashboard.competitors.is_empty());
    }

    #[tokio::test]
    async fn test_page_hints_override_details() {
        let h = harness(
            product_fetcher().route("keywordSearchResult", "plastic lunch box", json!({})),
        );
        let page = PageProduct {
            asin: Some(REF.to_string()),
            title: Some("Plastic Lunch Box".to_string()),
            ..Default::default()
        };

        let dashboard = h.service.run_product_flow(page).await.unwrap();

        assert_eq!(dashboard.search_term, "plastic lunch box");
        assert_eq!(dashboard.reference.title, "Plastic Lunch Box");
    }

    #[tokio::test]
    async fn test_missing_asin_is_rejected() {
        let h = harness(StubFetcher::default());

        let error = h
            .service
            .run_product_flow(PageProduct::default())
            .await
            .unwrap_err();

        assert!(matches!(error, DomainError::Validation { .. }));
        assert!(h.fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_last_run_is_recorded() {
        let h = harness(product_fetcher());

        h.service
            .run_product_flow(PageProduct::for_asin(REF))
            .await
            .unwrap();

        assert_eq!(h.storage.raw(LAST_RUN_ASIN_KEY), Some(json!(REF)));
        assert_eq!(
            h.storage.raw(LAST_RUN_PRODUCT_KEY).unwrap()["asin"],
            json!(REF)
        );
        let results = h.service.last_run().await.unwrap().unwrap();
        assert_eq!(results["competitors"][0]["asin"], json!("B001"));
        assert_eq!(
            results["competitors"][1]["error"],
            json!("Remote fetch failed: productDetails - 500 failure")
        );
    }

    #[tokio::test]
    async fn test_category_flow_uses_deepest_node() {
        let fetcher = product_fetcher().route(
            "categoryProducts",
            "300",
            json!({"search_results": [{"asin": "B0BEST0001"}], "total_indexed_products": 5000}),
        );
        let h = harness(fetcher);

        let dashboard = h.service.run_category_flow(REF).await.unwrap();

        assert_eq!(dashboard.category_id.as_deref(), Some("300"));
        let products = dashboard.category_products.unwrap();
        assert_eq!(products.data.total_indexed_products, Some(5000));
        assert!(dashboard.refreshed_details.from_cache);
        assert_eq!(h.fetcher.count("productDetails"), 1);
        assert_eq!(
            h.reporter.events(),
            vec![
                "product_details:fetch",
                "product_history:fetch",
                "category_products:fetch",
                "refresh_details:cache",
            ]
        );
    }

    #[tokio::test]
    async fn test_category_flow_without_category_skips_listing() {
        let fetcher = StubFetcher::default()
            .route("productDetails", REF, json!([{"product_attributes": {"title": "Bottle"}}]))
            .route("productHistory", REF, json!({}));
        let h = harness(fetcher);

        let dashboard = h.service.run_category_flow(REF).await.unwrap();

        assert!(dashboard.category_id.is_none());
        assert!(dashboard.category_products.is_none());
        assert_eq!(h.fetcher.count("categoryProducts"), 0);
        assert!(h
            .reporter
            .events()
            .contains(&"category_products:skipped".to_string()));
    }

    #[tokio::test]
    async fn test_enrichment_keeps_order_with_concurrency() {
        let mut fetcher = StubFetcher::default();
        for i in 0..6 {
            let asin = format!("B00{i}");
            fetcher = if i % 2 == 0 {
                fetcher.route("productDetails", &asin, details("x", 1.0))
            } else {
                fetcher.fail("productDetails", &asin, 503)
            };
        }
        let h = harness(fetcher);
        let reference = ReferenceProduct::new("Water Bottle", None);
        let ranked = (0..6)
            .map(|i| {
                CompetitorScorer::default()
                    .score(&reference, Candidate::new(format!("B00{i}"), "Bottle"))
            })
            .collect();

        let outcomes = h.service.enrich_competitors(ranked).await;

        let asins: Vec<_> = outcomes.iter().map(|o| o.asin().to_string()).collect();
        assert_eq!(asins, vec!["B000", "B001", "B002", "B003", "B004", "B005"]);
        let oks: Vec<_> = outcomes.iter().map(CompetitorOutcome::is_ok).collect();
        assert_eq!(oks, vec![true, false, true, false, true, false]);
    }

    #[test]
    fn test_required_asin() {
        assert_eq!(required_asin(Some(" b0ref00001 ")).unwrap(), REF);
        assert!(required_asin(Some("  ")).is_err());
        assert!(required_asin(None).is_err());
    }
}
