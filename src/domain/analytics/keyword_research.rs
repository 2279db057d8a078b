//! Reverse ASIN keyword research endpoint and DTO

use serde::Serialize;
use serde_json::{Map, Value};

use super::endpoint::{ApiRequest, Dto, Endpoint};
use super::json::Fields;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseAsinKeywordsParams {
    pub product_id: String,
    pub geo: String,
    pub page_number: u32,
    pub results_count: u32,
}

impl ReverseAsinKeywordsParams {
    pub fn new(product_id: impl Into<String>, geo: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            geo: geo.into(),
            page_number: 1,
            results_count: 50,
        }
    }

    pub fn with_page(mut self, page_number: u32) -> Self {
        self.page_number = page_number;
        self
    }

    pub fn with_results_count(mut self, results_count: u32) -> Self {
        self.results_count = results_count;
        self
    }
}

/// `GET /sellmetricsv2/keyword_research?type=asin`
#[derive(Debug)]
pub struct ReverseAsinKeywordsEndpoint;

impl Endpoint for ReverseAsinKeywordsEndpoint {
    const API_NAME: &'static str = "reverseAsinKeywords";
    type Params = ReverseAsinKeywordsParams;
    type Dto = KeywordResearch;

    fn request(params: &Self::Params) -> ApiRequest {
        ApiRequest::new(Self::API_NAME, "/sellmetricsv2/keyword_research")
            .with_param("type", "asin")
            .with_param("key", &params.product_id)
            .with_param("geo", params.geo.to_lowercase())
            .with_param("pagenumber", params.page_number)
            .with_param("results_count", params.results_count)
    }
}

/// Keywords a product ranks for
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeywordResearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keyword_list: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl KeywordResearch {
    /// Keyword text of an entry, whichever field the API used for it
    pub fn keyword_of(entry: &Value) -> Option<&str> {
        ["keyword", "kw", "name"]
            .iter()
            .find_map(|key| entry.get(key).and_then(Value::as_str))
            .filter(|s| !s.is_empty())
    }

    /// Search volume of an entry
    pub fn volume_of(entry: &Value) -> Option<&Value> {
        ["search_volume", "volume", "v"]
            .iter()
            .find_map(|key| entry.get(key))
            .filter(|v| !v.is_null())
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keyword_list.iter().filter_map(Self::keyword_of)
    }
}

impl Dto for KeywordResearch {
    fn from_json(value: &Value) -> Self {
        if let Value::Array(items) = value {
            return Self {
                keyword_list: items.clone(),
                ..Default::default()
            };
        }

        let mut fields = Fields::from_value(value);
        Self {
            title: fields.take_string("title"),
            keyword_list: fields.take_array("keyword_list").unwrap_or_default(),
            extra: fields.into_extra(),
        }
    }
}
