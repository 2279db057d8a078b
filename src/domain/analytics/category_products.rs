//! Category products endpoint and DTO

use serde::Serialize;
use serde_json::{Map, Value};

use super::endpoint::{ApiRequest, Dto, Endpoint};
use super::search_result::{listing_from_json, SearchResultItem};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProductsParams {
    pub category_id: String,
    pub geo: String,
    pub page_number: u32,
    pub extended_response: u8,
}

impl CategoryProductsParams {
    pub fn new(category_id: impl Into<String>, geo: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            geo: geo.into(),
            page_number: 1,
            extended_response: 1,
        }
    }

    pub fn with_page(mut self, page_number: u32) -> Self {
        self.page_number = page_number;
        self
    }
}

/// `GET /sellmetricsv2/category_products`
#[derive(Debug)]
pub struct CategoryProductsEndpoint;

impl Endpoint for CategoryProductsEndpoint {
    const API_NAME: &'static str = "categoryProducts";
    type Params = CategoryProductsParams;
    type Dto = CategoryProducts;

    fn request(params: &Self::Params) -> ApiRequest {
        ApiRequest::new(Self::API_NAME, "/sellmetricsv2/category_products")
            .with_param("category_id", &params.category_id)
            .with_param("geo", params.geo.to_lowercase())
            .with_param("pagenumber", params.page_number)
            .with_param("extended_response", params.extended_response)
    }
}

/// Best sellers of one category node
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryProducts {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub search_results: Vec<SearchResultItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_indexed_products: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dto for CategoryProducts {
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
    fn test_request_shape() {
        let request =
            CategoryProductsEndpoint::request(&CategoryProductsParams::new("3744541", "US"));

        assert_eq!(request.path, "/sellmetricsv2/category_products");
        assert_eq!(request.param("category_id"), Some("3744541"));
        assert_eq!(request.param("geo"), Some("us"));
        assert_eq!(request.param("pagenumber"), Some("1"));
        assert_eq!(request.param("extended_response"), Some("1"));
    }

    #[test]
    fn test_params_key_material_order() {
        let params = CategoryProductsParams::new("42", "us").with_page(3);
        assert_eq!(
            serde_json::to_string(&params).unwrap(),
            r#"{"categoryId":"42","geo":"us","pageNumber":3,"extendedResponse":1}"#
        );
    }

    #[test]
    fn test_from_json() {
        let products = CategoryProducts::from_json(&json!({
            "search_results": [{"asin": "B1", "title": "One"}],
            "total_indexed_products": 10
        }));
        assert_eq!(products.search_results.len(), 1);
        assert_eq!(products.total_indexed_products, Some(10));

        assert!(CategoryProducts::from_json(&json!(42)).search_results.is_empty());
        assert_eq!(CategoryProducts::from_json(&json!([{}, {}])).search_results.len(), 2);
    }

    #[test]
    fn test_serialize_keeps_mistyped_listing_once() {
        let input = json!({"search_results": "unavailable", "category": "Kitchen"});

        let text = serde_json::to_string(&CategoryProducts::from_json(&input)).unwrap();

        assert_eq!(text.matches("\"search_results\"").count(), 1);
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), input);
    }
}
