//! In-memory predicate evaluation.

use super::predicate::{Column, Field, Predicate};
use crate::catalog::Product;

/// Tolerance for numeric spec equality ("15.6" against 15.600000001).
const SPEC_EPSILON: f64 = 1e-6;

impl Predicate {
    /// Whether a product satisfies this predicate.
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Predicate::All(parts) => parts.iter().all(|p| p.matches(product)),
            Predicate::Any(parts) => parts.iter().any(|p| p.matches(product)),
            Predicate::Range { field, min, max } => {
                let Some(value) = number(product, *field) else {
                    return false;
                };
                min.is_none_or(|m| value >= m.as_f64()) && max.is_none_or(|m| value <= m.as_f64())
            }
            Predicate::OneOf { field, values } => {
                text(product, *field).is_some_and(|t| values.iter().any(|v| *v == t))
            }
            Predicate::Flag { field, value } => flag(product, *field) == Some(*value),
            Predicate::Contains { field, needle } => text(product, *field)
                .is_some_and(|t| t.to_lowercase().contains(&needle.to_lowercase())),
            Predicate::SpecEquals { key, value } => {
                match (product.spec_number(key), value.parse::<f64>()) {
                    (Some(actual), Ok(expected)) => (actual - expected).abs() < SPEC_EPSILON,
                    _ => false,
                }
            }
        }
    }
}

fn number(product: &Product, field: Field) -> Option<f64> {
    match field {
        Field::Column(Column::Price) => Some(product.price as f64),
        Field::Column(Column::StockQuantity) => Some(f64::from(product.stock_quantity)),
        Field::Column(Column::Rating) => product.rating,
        Field::Column(_) => None,
        Field::Spec(key) => product.spec_number(key),
    }
}

fn text(product: &Product, field: Field) -> Option<String> {
    match field {
        Field::Column(Column::Name) => Some(product.name.clone()),
        Field::Column(Column::Brand) => product.brand.clone(),
        Field::Column(Column::Condition) => product.condition.map(|c| c.as_str().to_string()),
        Field::Column(Column::Category) => Some(product.category.clone()),
        Field::Column(Column::Description) => product.description.clone(),
        Field::Column(Column::Id) => Some(product.id.to_string()),
        Field::Column(_) => None,
        Field::Spec(key) => product.spec_text(key),
    }
}

fn flag(product: &Product, field: Field) -> Option<bool> {
    match field {
        Field::Column(Column::HasWarranty) => Some(product.has_warranty),
        Field::Column(_) => None,
        Field::Spec(key) => product.spec_bool(key),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::query::predicate::Number;
    use serde_json::json;

    fn product(specs: serde_json::Value) -> Product {
        serde_json::from_value(json!({
            "id": "018f0000-0000-7000-8000-0000000000aa",
            "name": "ThinkPad T14",
            "brand": "Lenovo",
            "condition": "used",
            "category": "business-laptops",
            "price": 650,
            "stock_quantity": 0,
            "has_warranty": true,
            "description": "Business workhorse",
            "specs": specs
        }))
        .unwrap()
    }

    #[test]
    fn range_fails_on_missing_value() {
        let p = product(json!({}));
        let rating = Predicate::Range {
            field: Field::Column(Column::Rating),
            min: Some(Number::Float(3.0)),
            max: None,
        };
        assert!(!rating.matches(&p));

        let stock = Predicate::Range {
            field: Field::Column(Column::StockQuantity),
            min: None,
            max: Some(Number::Int(0)),
        };
        assert!(stock.matches(&p));
    }

    #[test]
    fn contains_ignores_case() {
        let p = product(json!({"processor": "Intel Core I5-1245U"}));
        let needle = Predicate::Contains {
            field: Field::Spec("processor"),
            needle: "i5".to_string(),
        };
        assert!(needle.matches(&p));

        let search = Predicate::Contains {
            field: Field::Column(Column::Description),
            needle: "WORKHORSE".to_string(),
        };
        assert!(search.matches(&p));
    }

    #[test]
    fn spec_equality_is_numeric() {
        let p = product(json!({"ram_gb": "16GB", "screen_size": 14}));
        let ram = Predicate::SpecEquals {
            key: "ram_gb",
            value: "16".to_string(),
        };
        let screen = Predicate::SpecEquals {
            key: "screen_size",
            value: "14".to_string(),
        };
        assert!(ram.matches(&p));
        assert!(screen.matches(&p));

        let missing = Predicate::SpecEquals {
            key: "ram_gb",
            value: "16".to_string(),
        };
        assert!(!missing.matches(&product(json!({}))));
    }

    #[test]
    fn empty_any_matches_nothing() {
        let p = product(json!({}));
        assert!(!Predicate::Any(vec![]).matches(&p));
        assert!(Predicate::always().matches(&p));
    }
}
