//! Store-agnostic compiled predicates.
//!
//! A [`Predicate`] is an AND-of-ORs tree over four matching modes: inclusive
//! range, set membership, boolean equality and case-insensitive substring.
//! Spec-bag numeric attributes add exact equality. Stores either render the
//! tree (SQL) or evaluate it directly (in memory).

use std::fmt;

use serde::Serialize;

/// Product columns a predicate or sort clause can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Id,
    Name,
    Brand,
    Condition,
    Category,
    Price,
    StockQuantity,
    HasWarranty,
    Rating,
    Description,
    CreatedAt,
}

impl Column {
    /// Database column name.
    pub fn as_str(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Name => "name",
            Column::Brand => "brand",
            Column::Condition => "condition",
            Column::Category => "category",
            Column::Price => "price",
            Column::StockQuantity => "stock_quantity",
            Column::HasWarranty => "has_warranty",
            Column::Rating => "rating",
            Column::Description => "description",
            Column::CreatedAt => "created_at",
        }
    }
}

/// A column or a key of the product spec bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Column(Column),
    Spec(&'static str),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Column(c) => f.write_str(c.as_str()),
            Field::Spec(key) => write!(f, "specs.{key}"),
        }
    }
}

/// Numeric range bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Compiled boolean expression over catalog rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Conjunction; empty means "no constraint".
    All(Vec<Predicate>),
    /// Disjunction; empty matches nothing.
    Any(Vec<Predicate>),
    /// Inclusive bounds; a missing field fails.
    Range {
        field: Field,
        min: Option<Number>,
        max: Option<Number>,
    },
    /// Field equals one of the values.
    OneOf { field: Field, values: Vec<String> },
    /// Boolean equality.
    Flag { field: Field, value: bool },
    /// Case-insensitive substring match.
    Contains { field: Field, needle: String },
    /// Exact equality of a numeric spec value, compared in canonical text
    /// form ("16", "15.6").
    SpecEquals { key: &'static str, value: String },
}

impl Predicate {
    /// The predicate matching every row.
    pub fn always() -> Self {
        Predicate::All(Vec::new())
    }

    /// Conjunction that drops "no constraint" parts and unwraps a single
    /// remaining part.
    pub fn all(parts: Vec<Predicate>) -> Self {
        let mut parts: Vec<Predicate> = parts.into_iter().filter(|p| !p.is_always()).collect();
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Predicate::All(parts)
        }
    }

    /// Disjunction that unwraps a single part.
    pub fn any(mut parts: Vec<Predicate>) -> Self {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Predicate::Any(parts)
        }
    }

    /// Whether this predicate places no constraint at all.
    pub fn is_always(&self) -> bool {
        matches!(self, Predicate::All(parts) if parts.is_empty())
    }

    /// Whether this predicate renders as one comparison in a conjunction.
    fn is_atomic(&self) -> bool {
        match self {
            Predicate::Flag { .. } | Predicate::Contains { .. } | Predicate::SpecEquals { .. } => {
                true
            }
            Predicate::Range { min, max, .. } => min.is_none() || max.is_none(),
            Predicate::All(parts) | Predicate::Any(parts) => parts.is_empty(),
            Predicate::OneOf { .. } => false,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::All(parts) if parts.is_empty() => f.write_str("TRUE"),
            Predicate::Any(parts) if parts.is_empty() => f.write_str("FALSE"),
            Predicate::All(parts) => write_joined(f, parts, " AND "),
            Predicate::Any(parts) => write_joined(f, parts, " OR "),
            Predicate::Range { field, min, max } => match (min, max) {
                (Some(min), Some(max)) => write!(f, "{field} >= {min} AND {field} <= {max}"),
                (Some(min), None) => write!(f, "{field} >= {min}"),
                (None, Some(max)) => write!(f, "{field} <= {max}"),
                (None, None) => f.write_str("TRUE"),
            },
            Predicate::OneOf { field, values } if values.is_empty() => {
                write!(f, "{field} IN ()")
            }
            Predicate::OneOf { field, values } => {
                let terms: Vec<String> = values.iter().map(|v| format!("{field} = {v}")).collect();
                f.write_str(&terms.join(" OR "))
            }
            Predicate::Flag { field, value } => write!(f, "{field} = {value}"),
            Predicate::Contains { field, needle } => write!(f, "{field} CONTAINS {needle:?}"),
            Predicate::SpecEquals { key, value } => write!(f, "specs.{key} = {value}"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[Predicate], separator: &str) -> fmt::Result {
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        if part.is_atomic() {
            write!(f, "{part}")?;
        } else {
            write!(f, "({part})")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brands(values: &[&str]) -> Predicate {
        Predicate::OneOf {
            field: Field::Column(Column::Brand),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn all_drops_trivial_parts_and_unwraps() {
        let p = Predicate::all(vec![Predicate::always(), brands(&["Dell"])]);
        assert_eq!(p, brands(&["Dell"]));

        assert!(Predicate::all(vec![Predicate::always()]).is_always());
    }

    #[test]
    fn display_groups_or_within_and() {
        let p = Predicate::all(vec![
            brands(&["Dell", "HP"]),
            Predicate::OneOf {
                field: Field::Column(Column::Condition),
                values: vec!["new".to_string()],
            },
        ]);
        assert_eq!(
            p.to_string(),
            "(brand = Dell OR brand = HP) AND (condition = new)"
        );
    }

    #[test]
    fn display_ranges_and_spec_fields() {
        let p = Predicate::all(vec![
            Predicate::Range {
                field: Field::Column(Column::Price),
                min: Some(Number::Int(100)),
                max: Some(Number::Int(500)),
            },
            Predicate::Flag {
                field: Field::Spec("dedicated_gpu"),
                value: true,
            },
        ]);
        assert_eq!(
            p.to_string(),
            "(price >= 100 AND price <= 500) AND specs.dedicated_gpu = true"
        );
        assert_eq!(Predicate::always().to_string(), "TRUE");
        assert_eq!(Predicate::Any(vec![]).to_string(), "FALSE");
    }
}
