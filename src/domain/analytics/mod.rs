//! Analytics domain - remote endpoints, fetcher seam and response DTOs

mod category_products;
mod endpoint;
mod json;
mod keyword_research;
mod product_details;
mod product_history;
mod search_result;
mod summary;

pub use category_products::{CategoryProducts, CategoryProductsEndpoint, CategoryProductsParams};
#[cfg(test)]
pub use endpoint::MockRemoteFetcher;
pub use endpoint::{ApiRequest, Dto, Endpoint, RemoteFetcher, RemoteResponse};
pub use json::{is_truthy, parse_money};
pub use keyword_research::{KeywordResearch, ReverseAsinKeywordsEndpoint, ReverseAsinKeywordsParams};
pub use product_details::{
    BsrNode, CategoryNode, PriceDetails, ProductAttributes, ProductDetails, ProductDetailsEndpoint,
    ProductDetailsParams, Ratings,
};
pub use product_history::{
    DEFAULT_HISTORY_DAYS, ProductHistory, ProductHistoryEndpoint, ProductHistoryParams,
};
pub use search_result::{KeywordSearchEndpoint, KeywordSearchParams, SearchResultItem, SearchResults};
pub use summary::{KeywordSummary, ProductSummary};
