//! Helpers for building DTOs out of loosely shaped JSON

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static MONEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+(\.\d+)?").unwrap());

/// Parses a money-like value: finite numbers pass through, strings have
/// commas stripped and yield their first decimal number.
pub fn parse_money(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => {
            let cleaned = s.replace(',', "");
            MONEY_RE
                .find(&cleaned)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Serde skip predicate for typed fields left at their default.
///
/// A known field with an unexpected JSON type stays in `extra` under its own
/// key, so the typed default must not be written next to it.
pub(crate) fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// JavaScript-style truthiness
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Object fields being consumed into a typed DTO.
///
/// Each `take_*` removes a field only when its JSON type matches; whatever is
/// left over becomes the DTO's `extra` map.
#[derive(Debug, Default)]
pub(crate) struct Fields(Map<String, Value>);

impl Fields {
    /// Non-object input yields no fields
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self(map.clone()),
            _ => Self::default(),
        }
    }

    fn take_if(&mut self, key: &str, matches: impl Fn(&Value) -> bool) -> Option<Value> {
        if self.0.get(key).is_some_and(matches) {
            self.0.remove(key)
        } else {
            None
        }
    }

    pub fn take_string(&mut self, key: &str) -> Option<String> {
        match self.take_if(key, Value::is_string)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Strings, or numbers rendered as strings (identifiers sent either way)
    pub fn take_id(&mut self, key: &str) -> Option<String> {
        match self.take_if(key, |v| v.is_string() || v.is_number())? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn take_f64(&mut self, key: &str) -> Option<f64> {
        self.take_if(key, Value::is_number)?.as_f64()
    }

    pub fn take_i64(&mut self, key: &str) -> Option<i64> {
        self.take_if(key, |v| v.is_i64())?.as_i64()
    }

    /// Any non-null value
    pub fn take_present(&mut self, key: &str) -> Option<Value> {
        self.take_if(key, |v| !v.is_null())
    }

    pub fn take_array(&mut self, key: &str) -> Option<Vec<Value>> {
        match self.take_if(key, Value::is_array)? {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Arrays made only of strings
    pub fn take_strings(&mut self, key: &str) -> Vec<String> {
        let all_strings =
            |v: &Value| v.as_array().is_some_and(|items| items.iter().all(Value::is_string));

        match self.take_if(key, all_strings) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn take_object(&mut self, key: &str) -> Map<String, Value> {
        match self.take_if(key, Value::is_object) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Nested object handed to another DTO constructor
    pub fn take_nested(&mut self, key: &str) -> Value {
        self.take_if(key, Value::is_object)
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    pub fn into_extra(self) -> Map<String, Value> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money(&json!(19.99)), Some(19.99));
        assert_eq!(parse_money(&json!("$1,299.50")), Some(1299.5));
        assert_eq!(parse_money(&json!("USD -3")), Some(-3.0));
        assert_eq!(parse_money(&json!("free")), None);
        assert_eq!(parse_money(&json!(null)), None);
        assert_eq!(parse_money(&json!({"amount": 5})), None);
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!([])));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
    }

    #[test]
    fn test_take_only_matching_types() {
        let mut fields = Fields::from_value(&json!({
            "title": 42,
            "brand": "Acme",
            "level": 3,
            "node_id": 1234,
        }));

        assert_eq!(fields.take_string("title"), None);
        assert_eq!(fields.take_string("brand").as_deref(), Some("Acme"));
        assert_eq!(fields.take_i64("level"), Some(3));
        assert_eq!(fields.take_id("node_id").as_deref(), Some("1234"));

        let extra = fields.into_extra();
        assert_eq!(extra.len(), 1);
        assert_eq!(extra["title"], json!(42));
    }

    #[test]
    fn test_take_strings_rejects_mixed_arrays() {
        let mut fields = Fields::from_value(&json!({
            "image_urls": ["a", "b"],
            "key_points": ["a", 1],
        }));

        assert_eq!(fields.take_strings("image_urls"), vec!["a", "b"]);
        assert!(fields.take_strings("key_points").is_empty());
        assert!(fields.into_extra().contains_key("key_points"));
    }

    #[test]
    fn test_non_object_has_no_fields() {
        let mut fields = Fields::from_value(&json!([1, 2, 3]));
        assert!(fields.take_array("anything").is_none());
        assert!(fields.into_extra().is_empty());
    }
}
