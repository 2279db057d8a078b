//! ASIN extraction from product page URLs

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

static DP_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/dp/([A-Z0-9]{10})(?:[/?]|$)").unwrap());
static PRODUCT_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/product/([A-Z0-9]{10})(?:[/?]|$)").unwrap());
static ASIN_QUERY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)asin=([A-Z0-9]{10})").unwrap());
static ANY_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([A-Z0-9]{10})(?:[/?&]|$)").unwrap());
static BARE_ASIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i)[A-Z0-9]{10}$").unwrap());

/// Finds the ASIN in an Amazon product URL.
///
/// Tries `/dp/<ASIN>`, then `/product/<ASIN>`, then an `asin=` query
/// parameter, and finally the first 10-character token in the whole URL that
/// ends at a separator and starts with `A`, `B` or a digit. Returns `None` for
/// strings that do not parse as URLs.
pub fn extract_asin_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let path = parsed.path();
    let query = parsed.query().unwrap_or_default();

    let capture = |re: &Regex, haystack: &str| {
        re.captures(haystack)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_uppercase())
    };

    if let Some(asin) = capture(&DP_PATH, path)
        .or_else(|| capture(&PRODUCT_PATH, path))
        .or_else(|| capture(&ASIN_QUERY, query))
    {
        return Some(asin);
    }

    capture(&ANY_TOKEN, url)
        .filter(|asin| asin.starts_with(|c: char| c == 'A' || c == 'B' || c.is_ascii_digit()))
}

/// Accepts either a bare ASIN or a product URL
pub fn resolve_asin(input: &str) -> Option<String> {
    let input = input.trim();
    if BARE_ASIN.is_match(input) {
        return Some(input.to_uppercase());
    }
    extract_asin_from_url(input)
}
