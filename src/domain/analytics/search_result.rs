//! Keyword search endpoint and DTO

use serde::Serialize;
use serde_json::{Map, Value};

use super::endpoint::{ApiRequest, Dto, Endpoint};
use super::json::Fields;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordSearchParams {
    pub search: String,
    pub geo: String,
    pub page_number: u32,
    pub extended_response: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_sponsored_results: Option<u8>,
}

impl KeywordSearchParams {
    pub fn new(search: impl Into<String>, geo: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            geo: geo.into(),
            page_number: 1,
            extended_response: 1,
            sort: None,
            include_sponsored_results: None,
        }
    }

    pub fn with_page(mut self, page_number: u32) -> Self {
        self.page_number = page_number;
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn with_sponsored(mut self, include: bool) -> Self {
        self.include_sponsored_results = Some(u8::from(include));
        self
    }
}

/// `GET /sellmetricsv2/keyword_search_result`
#[derive(Debug)]
pub struct KeywordSearchEndpoint;

impl Endpoint for KeywordSearchEndpoint {
    const API_NAME: &'static str = "keywordSearchResult";
    type Params = KeywordSearchParams;
    type Dto = SearchResults;

    fn request(params: &Self::Params) -> ApiRequest {
        ApiRequest::new(Self::API_NAME, "/sellmetricsv2/keyword_search_result")
            .with_param("geo", params.geo.to_lowercase())
            .with_param("search", &params.search)
            .with_param("pagenumber", params.page_number)
            .with_param("extended_response", params.extended_response)
            .with_optional_param("sort", params.sort.as_deref().filter(|s| !s.is_empty()))
            .with_optional_param("include_sponsored_results", params.include_sponsored_results)
    }
}

/// One listing row of a search or category response
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResultItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Number or formatted string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_price: Option<Value>,
    /// Boolean, 0/1 or string depending on the API version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_sponsored: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_rank: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dto for SearchResultItem {
    fn from_json(value: &Value) -> Self {
        let mut fields = Fields::from_value(value);
        Self {
            asin: fields.take_id("asin"),
            title: fields.take_string("title"),
            price: fields.take_present("price"),
            listing_price: fields.take_present("listing_price"),
            is_sponsored: fields.take_present("is_sponsored"),
            product_rank: fields.take_i64("product_rank"),
            extra: fields.into_extra(),
        }
    }
}

/// Rows plus index size, shared by search and category responses
pub(crate) fn listing_from_json(
    value: &Value,
) -> (Vec<SearchResultItem>, Option<i64>, Map<String, Value>) {
    if let Value::Array(items) = value {
        let rows = items.iter().map(SearchResultItem::from_json).collect();
        return (rows, None, Map::new());
    }

    let mut fields = Fields::from_value(value);
    let rows = fields
        .take_array("search_results")
        .unwrap_or_default()
        .iter()
        .map(SearchResultItem::from_json)
        .collect();
    let total = fields.take_i64("total_indexed_products");

    (rows, total, fields.into_extra())
}

/// Keyword search response
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub search_results: Vec<SearchResultItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_indexed_products: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dto for SearchResults {
    fn from_json(value: &Value) -> Self {
        let (search_results, total_indexed_products, extra) = listing_from_json(value);
        Self {
            search_results,
            total_indexed_products,
            extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_optional_params() {
        let plain = KeywordSearchEndpoint::request(&KeywordSearchParams::new("water bottle", "US"));
        assert_eq!(plain.param("geo"), Some("us"));
        assert_eq!(plain.param("search"), Some("water bottle"));
        assert_eq!(plain.param("extended_response"), Some("1"));
        assert_eq!(plain.param("sort"), None);
        assert_eq!(plain.param("include_sponsored_results"), None);

        let full = KeywordSearchEndpoint::request(
            &KeywordSearchParams::new("x", "us")
                .with_sort("price")
                .with_sponsored(true)
                .with_page(2),
        );
        assert_eq!(full.param("sort"), Some("price"));
        assert_eq!(full.param("include_sponsored_results"), Some("1"));
        assert_eq!(full.param("pagenumber"), Some("2"));
    }

    #[test]
    fn test_empty_sort_is_not_sent() {
        let request = KeywordSearchEndpoint::request(&KeywordSearchParams::new("x", "us").with_sort(""));
        assert_eq!(request.param("sort"), None);
    }

    #[test]
    fn test_params_omit_absent_options() {
        let params = KeywordSearchParams::new("bottle", "us");
        assert_eq!(
            serde_json::to_string(&params).unwrap(),
            r#"{"search":"bottle","geo":"us","pageNumber":1,"extendedResponse":1}"#
        );

        let params = params.with_sponsored(true);
        assert_eq!(
            serde_json::to_string(&params).unwrap(),
            r#"{"search":"bottle","geo":"us","pageNumber":1,"extendedResponse":1,"includeSponsoredResults":1}"#
        );
    }

    #[test]
    fn test_from_json() {
        let results = SearchResults::from_json(&json!({
            "search_results": [
                {"asin": "b001", "title": "Steel Bottle", "price": "$19.99", "is_sponsored": 1, "product_rank": 3},
                {"title": "No asin", "price": null, "rating": 4.5}
            ],
            "total_indexed_products": 1200,
            "keyword": "bottle"
        }));

        assert_eq!(results.search_results.len(), 2);
        assert_eq!(results.total_indexed_products, Some(1200));
        assert_eq!(results.extra["keyword"], json!("bottle"));

        let first = &results.search_results[0];
        assert_eq!(first.asin.as_deref(), Some("b001"));
        assert_eq!(first.price, Some(json!("$19.99")));
        assert_eq!(first.is_sponsored, Some(json!(1)));
        assert_eq!(first.product_rank, Some(3));

        let second = &results.search_results[1];
        assert!(second.asin.is_none());
        assert!(second.price.is_none());
        assert_eq!(second.extra["price"], json!(null));
        assert_eq!(second.extra["rating"], json!(4.5));
    }

    #[test]
    fn test_from_json_array_and_garbage() {
        assert_eq!(SearchResults::from_json(&json!([{"asin": "B1"}])).search_results.len(), 1);
        assert!(SearchResults::from_json(&json!("nope")).search_results.is_empty());
        assert!(SearchResults::from_json(&json!({"search_results": 5})).search_results.is_empty());
    }

    #[test]
    fn test_serialize_keeps_mistyped_listing_once() {
        let input = json!({"search_results": 5, "total_indexed_products": "many"});

        let text = serde_json::to_string(&SearchResults::from_json(&input)).unwrap();

        assert_eq!(text.matches("\"search_results\"").count(), 1);
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), input);
    }

    #[test]
    fn test_serialize_reproduces_input() {
        let input = json!({
            "search_results": [{"asin": "B001", "title": "Bottle", "price": "$9.99", "rating": 4.1}],
            "total_indexed_products": 12,
            "keyword": "bottle"
        });

        let value = serde_json::to_value(SearchResults::from_json(&input)).unwrap();

        assert_eq!(value, input);
    }
}
