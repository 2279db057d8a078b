//! Analytics API transport and the per-endpoint repositories

mod fetcher;
mod http_client;

pub use fetcher::{SellerAppFetcher, TokenStatus, DEFAULT_SELLERAPP_BASE_URL};
#[cfg(test)]
pub use http_client::mock::MockHttpClient;
pub use http_client::{HttpClient, HttpClientTrait, HttpResponse};

use crate::domain::analytics::{
    CategoryProductsEndpoint, KeywordSearchEndpoint, ProductDetailsEndpoint,
    ProductHistoryEndpoint, ReverseAsinKeywordsEndpoint,
};
use crate::domain::repository::CachedRepository;

pub type ProductDetailsRepository = CachedRepository<ProductDetailsEndpoint>;
pub type ProductHistoryRepository = CachedRepository<ProductHistoryEndpoint>;
pub type KeywordSearchRepository = CachedRepository<KeywordSearchEndpoint>;
pub type ReverseAsinKeywordsRepository = CachedRepository<ReverseAsinKeywordsEndpoint>;
pub type CategoryProductsRepository = CachedRepository<CategoryProductsEndpoint>;
