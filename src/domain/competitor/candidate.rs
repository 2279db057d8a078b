//! Competitor candidates and the reference product they are compared to

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::analytics::{is_truthy, parse_money, ProductDetails, SearchResultItem};

/// A product listed in search results that may compete with the reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub asin: String,
    pub title: String,
    pub search_price: Option<f64>,
    pub is_sponsored: bool,
}

impl Candidate {
    pub fn new(asin: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            asin: asin.into(),
            title: title.into(),
            search_price: None,
            is_sponsored: false,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.search_price = Some(price);
        self
    }

    pub fn sponsored(mut self, is_sponsored: bool) -> Self {
        self.is_sponsored = is_sponsored;
        self
    }

    /// Builds candidates from listing rows, skipping rows without an ASIN
    pub fn from_search_results(rows: &[SearchResultItem]) -> Vec<Candidate> {
        rows.iter()
            .filter_map(|row| {
                let asin = row.asin.as_deref().filter(|a| !a.is_empty())?;
                Some(Candidate {
                    asin: asin.to_uppercase(),
                    title: row.title.clone().unwrap_or_default(),
                    search_price: row
                        .price
                        .as_ref()
                        .and_then(parse_money)
                        .or_else(|| row.listing_price.as_ref().and_then(parse_money)),
                    is_sponsored: row.is_sponsored.as_ref().is_some_and(is_truthy),
                })
            })
            .collect()
    }
}

/// Product facts scraped from the page the user is looking at.
///
/// Every field is a best-effort hint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageProduct {
    pub asin: Option<String>,
    pub title: Option<String>,
    pub price: Option<Value>,
    pub rating: Option<Value>,
    pub review_count: Option<Value>,
    pub dimensions: Option<Value>,
}

impl PageProduct {
    pub fn for_asin(asin: impl Into<String>) -> Self {
        Self {
            asin: Some(asin.into()),
            ..Default::default()
        }
    }
}

/// The product candidates are scored against
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceProduct {
    pub asin: Option<String>,
    pub title: String,
    pub price: Option<f64>,
}

impl ReferenceProduct {
    pub fn new(title: impl Into<String>, price: Option<f64>) -> Self {
        Self {
            asin: None,
            title: title.into(),
            price,
        }
    }

    pub fn with_asin(mut self, asin: impl Into<String>) -> Self {
        self.asin = Some(asin.into());
        self
    }

    /// Page hints win; the product details response fills the gaps
    pub fn resolve(page: &PageProduct, details: &ProductDetails) -> Self {
        let raw_str = |key: &str| {
            details
                .raw_field(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let title = page
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| raw_str("title"))
            .or_else(|| raw_str("product_title"))
            .or_else(|| details.product_attributes.title.clone())
            .unwrap_or_default();

        let price = page
            .price
            .as_ref()
            .and_then(parse_money)
            .or_else(|| {
                ["price", "current_price", "product_price"]
                    .iter()
                    .find_map(|key| details.raw_field(key).and_then(parse_money))
            })
            .or_else(|| details.price_details.listing_price());

        let asin = page
            .asin
            .clone()
            .or_else(|| details.product_attributes.asin.clone())
            .map(|a| a.to_uppercase());

        Self { asin, title, price }
    }
}

/// Node id of the most specific category.
///
/// The first node wins ties between positive levels. A current pick at level
/// 0 (or without a level) ranks as -1, so a later level-0 node replaces it.
pub fn deepest_category_id(details: &ProductDetails) -> Option<String> {
    let mut nodes = details.product_attributes.category.iter();
    let mut deepest = nodes.next()?;

    for node in nodes {
        let current = deepest.level.filter(|level| *level != 0).unwrap_or(-1);
        if node.level.is_some_and(|level| level > current) {
            deepest = node;
        }
    }

    deepest.node_id.clone().filter(|id| !id.is_empty())
}
