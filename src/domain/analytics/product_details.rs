//! Product details endpoint and DTO

use serde::Serialize;
use serde_json::{Map, Value};

use super::endpoint::{ApiRequest, Dto, Endpoint};
use super::json::{is_default, parse_money, Fields};

/// Parameters for a product details lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailsParams {
    pub product_id: String,
    pub geo: String,
}

impl ProductDetailsParams {
    pub fn new(product_id: impl Into<String>, geo: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            geo: geo.into(),
        }
    }
}

/// `GET /sellmetricsv2/products`
#[derive(Debug)]
pub struct ProductDetailsEndpoint;

impl Endpoint for ProductDetailsEndpoint {
    const API_NAME: &'static str = "productDetails";
    type Params = ProductDetailsParams;
    type Dto = ProductDetails;

    fn request(params: &Self::Params) -> ApiRequest {
        ApiRequest::new(Self::API_NAME, "/sellmetricsv2/products")
            .with_param("product_specifications", 1)
            .with_param("potential_detail", 1)
            .with_param("price_detail", 1)
            .with_param("fee_detail", 1)
            .with_param("ratings", 1)
            .with_param("promotions", 1)
            .with_param("realtime_data", 1)
            .with_param("geo", &params.geo)
            .with_param("productIds", &params.product_id)
    }
}

/// Element of `product_attributes.category`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dto for CategoryNode {
    fn from_json(value: &Value) -> Self {
        let mut fields = Fields::from_value(value);
        Self {
            node_id: fields.take_id("node_id"),
            name: fields.take_string("name"),
            level: fields.take_i64("level"),
            extra: fields.into_extra(),
        }
    }
}

/// Element of `product_attributes.bsr`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BsrNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dto for BsrNode {
    fn from_json(value: &Value) -> Self {
        let mut fields = Fields::from_value(value);
        Self {
            rank: fields.take_i64("rank"),
            category: fields.take_string("category"),
            extra: fields.into_extra(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub image_urls: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_points: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<CategoryNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bsr: Vec<BsrNode>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dto for ProductAttributes {
    fn from_json(value: &Value) -> Self {
        let mut fields = Fields::from_value(value);
        let nodes = |items: Option<Vec<Value>>| items.unwrap_or_default();

        Self {
            asin: fields.take_string("asin"),
            title: fields.take_string("title"),
            brand: fields.take_string("brand"),
            url: fields.take_string("url"),
            manufacturer: fields.take_string("manufacturer"),
            image_urls: fields.take_strings("image_urls"),
            key_points: fields.take_strings("key_points"),
            category: nodes(fields.take_array("category"))
                .iter()
                .map(CategoryNode::from_json)
                .collect(),
            bsr: nodes(fields.take_array("bsr"))
                .iter()
                .map(BsrNode::from_json)
                .collect(),
            extra: fields.into_extra(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landed_price_new: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_price_new: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PriceDetails {
    /// Listing price, accepting string-formatted amounts as well
    pub fn listing_price(&self) -> Option<f64> {
        self.listing_price_new
            .or_else(|| self.extra.get("listing_price_new").and_then(parse_money))
    }

    /// Landed price, falling back to the listing price
    pub fn landed_price(&self) -> Option<f64> {
        self.landed_price_new
            .or_else(|| self.extra.get("landed_price_new").and_then(parse_money))
            .or_else(|| self.listing_price())
    }
}

impl Dto for PriceDetails {
    fn from_json(value: &Value) -> Self {
        let mut fields = Fields::from_value(value);
        Self {
            landed_price_new: fields.take_f64("landed_price_new"),
            listing_price_new: fields.take_f64("listing_price_new"),
            currency_code: fields.take_string("currency_code"),
            extra: fields.into_extra(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ratings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_ratings: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dto for Ratings {
    fn from_json(value: &Value) -> Self {
        let mut fields = Fields::from_value(value);
        Self {
            ratings: fields.take_f64("ratings"),
            number_of_ratings: fields.take_i64("number_of_ratings"),
            extra: fields.into_extra(),
        }
    }
}

/// One product from the product details response.
///
/// The API answers with an array; only its first element is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductDetails {
    #[serde(skip_serializing_if = "is_default")]
    pub product_attributes: ProductAttributes,
    #[serde(skip_serializing_if = "is_default")]
    pub price_details: PriceDetails,
    #[serde(skip_serializing_if = "is_default")]
    pub ratings: Ratings,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub fee_details: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub product_potential: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub product_specifications: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub promotions: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProductDetails {
    /// Top-level value not modelled by a typed field
    pub fn raw_field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

impl Dto for ProductDetails {
    fn from_json(value: &Value) -> Self {
        let element = match value {
            Value::Array(items) => items.first().cloned().unwrap_or(Value::Null),
            other => other.clone(),
        };
        let mut fields = Fields::from_value(&element);

        Self {
            product_attributes: ProductAttributes::from_json(
                &fields.take_nested("product_attributes"),
            ),
            price_details: PriceDetails::from_json(&fields.take_nested("price_details")),
            ratings: Ratings::from_json(&fields.take_nested("ratings")),
            fee_details: fields.take_object("fee_details"),
            product_potential: fields.take_object("product_potential"),
            product_specifications: fields.take_object("product_specifications"),
            promotions: fields.take_object("promotions"),
            extra: fields.into_extra(),
        }
    }
}
