//! Product history endpoint and DTO

use serde::Serialize;
use serde_json::{Map, Value};

use super::endpoint::{ApiRequest, Dto, Endpoint};
use super::json::Fields;

pub const DEFAULT_HISTORY_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductHistoryParams {
    pub product_id: String,
    pub geo: String,
    pub days: u32,
}

impl ProductHistoryParams {
    pub fn new(product_id: impl Into<String>, geo: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            geo: geo.into(),
            days: DEFAULT_HISTORY_DAYS,
        }
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }
}

/// `GET /sellmetricsv2/products/history`
#[derive(Debug)]
pub struct ProductHistoryEndpoint;

impl Endpoint for ProductHistoryEndpoint {
    const API_NAME: &'static str = "productHistory";
    type Params = ProductHistoryParams;
    type Dto = ProductHistory;

    fn request(params: &Self::Params) -> ApiRequest {
        ApiRequest::new(Self::API_NAME, "/sellmetricsv2/products/history")
            .with_param("productId", &params.product_id)
            .with_param("geo", params.geo.to_uppercase())
            .with_param("days", params.days)
            .with_param("price", 1)
            .with_param("bsr", 1)
            .with_param("rating", 1)
            .with_param("review_count", 1)
            .with_param("sellers_count", 1)
    }
}

/// Historical series for one product
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductHistory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_history: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bsr_history: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings_history: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count_history: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProductHistory {
    /// Number of price points, zero when the series is missing
    pub fn price_points(&self) -> usize {
        self.price_history.as_ref().map_or(0, Vec::len)
    }
}

impl Dto for ProductHistory {
    fn from_json(value: &Value) -> Self {
        if let Value::Array(items) = value {
            return Self {
                price_history: Some(items.clone()),
                ..Default::default()
            };
        }

        let mut fields = Fields::from_value(value);
        Self {
            price_history: fields.take_array("price_history"),
            bsr_history: fields.take_array("bsr_history"),
            ratings_history: fields.take_array("ratings_history"),
            review_count_history: fields.take_array("review_count_history"),
            extra: fields.into_extra(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_uppercases_geo() {
        let request = ProductHistoryEndpoint::request(&ProductHistoryParams::new("B0", "us"));

        assert_eq!(request.path, "/sellmetricsv2/products/history");
        assert_eq!(request.param("geo"), Some("US"));
        assert_eq!(request.param("days"), Some("30"));
        assert_eq!(request.param("productId"), Some("B0"));
        assert_eq!(request.param("sellers_count"), Some("1"));
    }

    #[test]
    fn test_params_key_material_order() {
        let params = ProductHistoryParams::new("B0", "us").with_days(90);
        assert_eq!(
            serde_json::to_string(&params).unwrap(),
            r#"{"productId":"B0","geo":"us","days":90}"#
        );
    }

    #[test]
    fn test_from_json_object() {
        let history = ProductHistory::from_json(&json!({
            "price_history": [[1, 19.99], [2, 18.5]],
            "bsr_history": "unavailable",
            "new_product_sellers_history": []
        }));

        assert_eq!(history.price_points(), 2);
        assert!(history.bsr_history.is_none());
        assert_eq!(history.extra["bsr_history"], json!("unavailable"));
        assert!(history.extra.contains_key("new_product_sellers_history"));
    }

    #[test]
    fn test_from_json_array_is_price_history() {
        let history = ProductHistory::from_json(&json!([1, 2, 3]));
        assert_eq!(history.price_points(), 3);
    }

    #[test]
    fn test_from_json_is_total() {
        for value in [json!(null), json!(false), json!("x"), json!({})] {
            assert_eq!(ProductHistory::from_json(&value).price_points(), 0);
        }
    }
}
