//! Cache key generation strategies

use std::fmt::Debug;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Namespace prefix shared by every analytics cache key
pub const CACHE_PREFIX: &str = "api_cache_";

/// Trait for generating cache keys from an API name and its parameters
pub trait CacheKeyGenerator: Send + Sync + Debug {
    /// Generates the hash component of a key
    fn hash(&self, params: &CacheKeyParams) -> String;

    /// Generates the full, namespaced key: `api_cache_<api>_<hash>`
    fn generate(&self, params: &CacheKeyParams) -> String {
        format!("{}{}_{}", CACHE_PREFIX, params.api_name, self.hash(params))
    }
}

/// Parameters for cache key generation
#[derive(Debug, Clone, Default)]
pub struct CacheKeyParams {
    /// Endpoint identifier (e.g. `productDetails`)
    pub api_name: String,
    /// Parameters serialized once, in field declaration order
    pub serialized: String,
}

impl CacheKeyParams {
    /// Creates key parameters from an already serialized parameter string
    pub fn new(api_name: impl Into<String>, serialized: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            serialized: serialized.into(),
        }
    }

    /// Creates parameters from a serializable value
    pub fn from_serializable<T: Serialize>(
        api_name: impl Into<String>,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(value)?;
        Ok(Self::new(api_name, json))
    }
}

/// Key generator compatible with entries written by the browser extension.
///
/// 32-bit rolling hash (`h = h * 31 + unit`) over the UTF-16 code units of
/// the insertion-ordered JSON, absolute value, base 36. Collisions serve the
/// wrong payload silently.
#[derive(Debug, Clone, Default)]
pub struct LegacyKeyGenerator;

impl LegacyKeyGenerator {
    pub fn new() -> Self {
        Self
    }

    fn rolling_hash(input: &str) -> i32 {
        input
            .encode_utf16()
            .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32))
    }
}

impl CacheKeyGenerator for LegacyKeyGenerator {
    fn hash(&self, params: &CacheKeyParams) -> String {
        let hash = Self::rolling_hash(&params.serialized);
        to_base36((hash as i64).unsigned_abs())
    }
}

/// Default key generator: canonical JSON, SHA-256 truncated to 128 bits.
///
/// Object keys are sorted recursively before hashing, so two parameter
/// objects that differ only in key order map to the same key.
#[derive(Debug, Clone, Default)]
pub struct CanonicalKeyGenerator;

impl CanonicalKeyGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl CacheKeyGenerator for CanonicalKeyGenerator {
    fn hash(&self, params: &CacheKeyParams) -> String {
        let canonical = match serde_json::from_str::<Value>(&params.serialized) {
            Ok(value) => {
                let mut out = String::with_capacity(params.serialized.len());
                write_canonical(&value, &mut out);
                out
            }
            Err(_) => params.serialized.clone(),
        };

        let digest = Sha256::digest(canonical.as_bytes());
        hex::encode(&digest[..16])
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, inner)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(inner, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, inner) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(inner, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut buf = Vec::new();
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();

    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct DetailsParams {
        product_id: String,
        geo: String,
    }

    fn details(product_id: &str) -> CacheKeyParams {
        CacheKeyParams::from_serializable(
            "productDetails",
            &DetailsParams {
                product_id: product_id.to_string(),
                geo: "us".to_string(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_params_keep_declaration_order() {
        let params = details("B000000000");
        assert_eq!(params.serialized, r#"{"productId":"B000000000","geo":"us"}"#);
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(97), "2p");
    }

    #[test]
    fn test_legacy_rolling_hash() {
        assert_eq!(LegacyKeyGenerator::rolling_hash(""), 0);
        assert_eq!(LegacyKeyGenerator::rolling_hash("a"), 97);
        assert_eq!(LegacyKeyGenerator::rolling_hash("ab"), 97 * 31 + 98);
    }

    #[test]
    fn test_legacy_hash_wraps_and_takes_abs() {
        // Long input overflows i32 many times; result must stay a valid base36 of |h|
        let input = "x".repeat(1000);
        let hash = LegacyKeyGenerator::rolling_hash(&input);
        let params = CacheKeyParams::new("t", input);
        let expected = to_base36((hash as i64).unsigned_abs());
        assert_eq!(LegacyKeyGenerator::new().hash(&params), expected);
    }

    #[test]
    fn test_legacy_key_format() {
        let key = LegacyKeyGenerator::new().generate(&CacheKeyParams::new("productDetails", "a"));
        assert_eq!(key, "api_cache_productDetails_2p");
    }

    #[test]
    fn test_key_determinism() {
        for generator in [
            &LegacyKeyGenerator as &dyn CacheKeyGenerator,
            &CanonicalKeyGenerator as &dyn CacheKeyGenerator,
        ] {
            let first = generator.generate(&details("B000000000"));
            let second = generator.generate(&details("B000000000"));
            assert_eq!(first, second);
            assert!(first.starts_with("api_cache_productDetails_"));
        }
    }

    #[test]
    fn test_key_sensitivity() {
        for generator in [
            &LegacyKeyGenerator as &dyn CacheKeyGenerator,
            &CanonicalKeyGenerator as &dyn CacheKeyGenerator,
        ] {
            let a = generator.generate(&details("B100000000"));
            let b = generator.generate(&details("B200000000"));
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_canonical_ignores_key_order() {
        let generator = CanonicalKeyGenerator::new();
        let a = CacheKeyParams::new("p", r#"{"productId":"B1","geo":"us","nested":{"b":1,"a":2}}"#);
        let b = CacheKeyParams::new("p", r#"{"nested":{"a":2,"b":1},"geo":"us","productId":"B1"}"#);
        assert_eq!(generator.generate(&a), generator.generate(&b));
    }

    #[test]
    fn test_legacy_respects_key_order() {
        let generator = LegacyKeyGenerator::new();
        let a = CacheKeyParams::new("p", r#"{"productId":"B1","geo":"us"}"#);
        let b = CacheKeyParams::new("p", r#"{"geo":"us","productId":"B1"}"#);
        assert_ne!(generator.generate(&a), generator.generate(&b));
    }

    #[test]
    fn test_canonical_hash_is_128_bit_hex() {
        let hash = CanonicalKeyGenerator::new().hash(&details("B000000000"));
        assert_eq!(hash.len(), 32);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_api_name_is_part_of_key() {
        let generator = CanonicalKeyGenerator::new();
        let a = generator.generate(&CacheKeyParams::new("productDetails", "{}"));
        let b = generator.generate(&CacheKeyParams::new("productHistory", "{}"));
        assert_ne!(a, b);
    }
}
