//! Headline figures pulled out of the larger responses

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::keyword_research::KeywordResearch;
use super::product_details::ProductDetails;

const KEYWORD_PREVIEW_LEN: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductSummary {
    pub title: Option<String>,
    pub brand: Option<String>,
    /// Landed price, or the listing price when no landed price is known
    pub price: Option<f64>,
    pub listing_price: Option<f64>,
    pub rating: Option<f64>,
    pub reviews: Option<i64>,
    pub bsr: Option<i64>,
    pub sales_estimate_high: Option<Value>,
    pub revenue_estimate_high: Option<Value>,
}

impl ProductSummary {
    pub fn from_details(details: &ProductDetails) -> Self {
        let attributes = &details.product_attributes;
        let attribute_str = |key: &str| {
            attributes
                .extra
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let potential = |key: &str| {
            details
                .product_potential
                .get(key)
                .filter(|v| !v.is_null())
                .cloned()
        };

        Self {
            title: attributes
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .or_else(|| attribute_str("product_title"))
                .or_else(|| attribute_str("name")),
            brand: attributes.brand.clone().filter(|b| !b.is_empty()),
            price: details.price_details.landed_price(),
            listing_price: details.price_details.listing_price(),
            rating: details.ratings.ratings,
            reviews: details.ratings.number_of_ratings,
            bsr: attributes.bsr.first().and_then(|node| node.rank),
            sales_estimate_high: potential("sales_estimate_high"),
            revenue_estimate_high: potential("revenue_estimate_high"),
        }
    }
}

fn or_na<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn money(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("${:.2}", v))
}

fn scalar(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "N/A".to_string(),
    }
}

impl fmt::Display for ProductSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Title:         {}",
            self.title.as_deref().unwrap_or("(unknown title)")
        )?;
        writeln!(f, "Brand:         {}", or_na(self.brand.as_deref()))?;
        writeln!(f, "Price:         {}", money(self.price))?;
        writeln!(f, "Listing price: {}", money(self.listing_price))?;
        writeln!(f, "Rating:        {}", or_na(self.rating))?;
        writeln!(f, "Reviews:       {}", or_na(self.reviews))?;
        writeln!(f, "BSR:           {}", or_na(self.bsr))?;
        writeln!(f, "Sales (high):  {}", scalar(self.sales_estimate_high.as_ref()))?;
        write!(f, "Revenue (high): {}", scalar(self.revenue_estimate_high.as_ref()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeywordSummary {
    pub count: usize,
    pub top_keyword: Option<String>,
    pub top_volume: Option<Value>,
    pub preview: Vec<Value>,
}

impl KeywordSummary {
    /// The top keyword is the first entry as returned by the API
    pub fn from_research(research: &KeywordResearch) -> Self {
        let first = research.keyword_list.first();
        Self {
            count: research.keyword_list.len(),
            top_keyword: first
                .and_then(KeywordResearch::keyword_of)
                .map(str::to_string),
            top_volume: first.and_then(KeywordResearch::volume_of).cloned(),
            preview: research
                .keyword_list
                .iter()
                .take(KEYWORD_PREVIEW_LEN)
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Display for KeywordSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} keywords, top: {} (volume {})",
            self.count,
            or_na(self.top_keyword.as_deref()),
            scalar(self.top_volume.as_ref())
        )
    }
}
