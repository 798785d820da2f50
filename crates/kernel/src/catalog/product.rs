//! Catalog product rows.
//!
//! Products carry a semi-structured `specs` bag: category-specific key/value
//! pairs that are only partially populated. Accessors here never fail on a
//! missing or oddly typed key; they return `None`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::filter::Condition;

/// Spec bag keys matched by the query compiler and the facet aggregator.
pub mod spec_keys {
    pub const PROCESSOR: &str = "processor";
    pub const RAM_GB: &str = "ram_gb";
    pub const STORAGE_TYPE: &str = "storage_type";
    pub const SCREEN_SIZE: &str = "screen_size";
    pub const GRAPHICS: &str = "graphics";
    pub const CPU: &str = "cpu";
    pub const DEDICATED_GPU: &str = "dedicated_gpu";
    pub const RAM_TYPE: &str = "ram_type";
    pub const SSD_TYPE: &str = "ssd_type";
    pub const PSU_CERTIFICATION: &str = "psu_certification";
}

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,

    pub name: String,

    #[serde(default)]
    pub slug: String,

    #[serde(default)]
    pub brand: Option<String>,

    /// Unknown condition strings read as `None`.
    #[serde(default, deserialize_with = "lenient_condition")]
    pub condition: Option<Condition>,

    /// Category slug.
    pub category: String,

    /// Price in the catalog currency unit.
    pub price: i64,

    /// Price before discount, when one was recorded.
    #[serde(default)]
    pub original_price: Option<i64>,

    #[serde(default)]
    pub stock_quantity: i32,

    #[serde(default)]
    pub has_warranty: bool,

    /// Average rating, 0 to 5.
    #[serde(default)]
    pub rating: Option<f64>,

    #[serde(default)]
    pub description: Option<String>,

    /// Category-specific attributes.
    #[serde(default, deserialize_with = "lenient_specs")]
    pub specs: Map<String, Value>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    /// `(original - price) / original`, zero without a usable original price.
    pub fn discount_ratio(&self) -> f64 {
        match self.original_price {
            Some(original) if original > 0 => (original - self.price) as f64 / original as f64,
            _ => 0.0,
        }
    }

    /// Spec value rendered as text. Strings are trimmed; arrays, objects,
    /// nulls and blank strings read as absent.
    pub fn spec_text(&self, key: &str) -> Option<String> {
        match self.specs.get(key)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Spec value read as a number. Strings contribute their leading
    /// numeric part ("16GB" reads as 16).
    pub fn spec_number(&self, key: &str) -> Option<f64> {
        match self.specs.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                let trimmed = s.trim();
                let end = trimmed
                    .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                    .unwrap_or(trimmed.len());
                trimmed[..end].parse().ok()
            }
            _ => None,
        }
    }

    /// Spec value read as a boolean (`true`/`false` or their string forms).
    pub fn spec_bool(&self, key: &str) -> Option<bool> {
        match self.specs.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

fn lenient_condition<'de, D>(deserializer: D) -> Result<Option<Condition>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.to_lowercase().parse().ok()))
}

fn lenient_specs<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn laptop() -> Product {
        serde_json::from_value(json!({
            "id": "018f0000-0000-7000-8000-000000000001",
            "name": "XPS 15",
            "brand": "Dell",
            "condition": "Refurbished",
            "category": "laptops",
            "price": 1500,
            "original_price": 2000,
            "stock_quantity": 3,
            "specs": {
                "processor": "Intel Core i7-13700H",
                "ram_gb": 16,
                "storage_type": " 1TB SSD ",
                "screen_size": "15.6",
                "dedicated_gpu": "true",
                "ports": ["usb-c"]
            }
        }))
        .unwrap()
    }

    #[test]
    fn deserializes_with_defaults() {
        let p = laptop();
        assert_eq!(p.condition, Some(Condition::Refurbished));
        assert!(!p.has_warranty);
        assert!(p.rating.is_none());
        assert!(p.in_stock());
    }

    #[test]
    fn unknown_condition_and_null_specs_are_tolerated() {
        let p: Product = serde_json::from_value(json!({
            "id": "018f0000-0000-7000-8000-000000000002",
            "name": "Mystery box",
            "condition": "open-box",
            "category": "components",
            "price": 10,
            "specs": null
        }))
        .unwrap();
        assert!(p.condition.is_none());
        assert!(p.specs.is_empty());
    }

    #[test]
    fn spec_accessors() {
        let p = laptop();
        assert_eq!(p.spec_text("storage_type").as_deref(), Some("1TB SSD"));
        assert_eq!(p.spec_text("ram_gb").as_deref(), Some("16"));
        assert_eq!(p.spec_number("screen_size"), Some(15.6));
        assert_eq!(p.spec_bool("dedicated_gpu"), Some(true));
        assert!(p.spec_text("ports").is_none());
        assert!(p.spec_text("missing").is_none());
    }

    #[test]
    fn discount_ratio() {
        let mut p = laptop();
        assert!((p.discount_ratio() - 0.25).abs() < f64::EPSILON);

        p.original_price = None;
        assert_eq!(p.discount_ratio(), 0.0);
    }
}
