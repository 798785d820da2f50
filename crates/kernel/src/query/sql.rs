//! PostgreSQL rendering of compiled catalog queries using SeaQuery.
//!
//! Spec-bag attributes are read from the `specs` JSONB column with `->>`.
//! Spec keys are compile-time constants, so they are spliced directly into
//! custom expressions; every user-supplied value goes through SeaQuery.

use sea_query::{
    Alias, Asterisk, Cond, Expr, ExprTrait, NullOrdering, Order, PostgresQueryBuilder, Query,
    SelectStatement, SimpleExpr, Value,
};

use super::compiler::{CatalogQuery, SortDirection};
use super::predicate::{Column, Field, Number, Predicate};

/// Catalog table name.
pub const PRODUCT_TABLE: &str = "product";

/// Renders a [`CatalogQuery`] as SQL.
pub struct CatalogSqlBuilder<'a> {
    query: &'a CatalogQuery,
}

impl<'a> CatalogSqlBuilder<'a> {
    pub fn new(query: &'a CatalogQuery) -> Self {
        Self { query }
    }

    /// Build the page SELECT with ordering and LIMIT/OFFSET.
    pub fn build(&self) -> String {
        let mut select = Query::select();
        select
            .column((Alias::new(PRODUCT_TABLE), Asterisk))
            .from(Alias::new(PRODUCT_TABLE));

        self.add_conditions(&mut select);
        self.add_sort(&mut select);

        select.limit(self.query.limit);
        select.offset(self.query.offset);

        select.to_string(PostgresQueryBuilder)
    }

    /// Build a COUNT query for the total number of matches.
    pub fn build_count(&self) -> String {
        let mut select = Query::select();
        select
            .expr(Expr::col(Asterisk).count())
            .from(Alias::new(PRODUCT_TABLE));

        self.add_conditions(&mut select);

        select.to_string(PostgresQueryBuilder)
    }

    /// Category scope plus the compiled predicate.
    fn add_conditions(&self, select: &mut SelectStatement) {
        if !self.query.scope.is_empty() {
            select.and_where(column(Column::Category).is_in(self.query.scope.clone()));
        }
        if !self.query.predicate.is_always() {
            select.and_where(condition(&self.query.predicate));
        }
    }

    fn add_sort(&self, select: &mut SelectStatement) {
        let sort = self.query.sort;
        let order = match sort.direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        let col = (Alias::new(PRODUCT_TABLE), Alias::new(sort.column.as_str()));

        if sort.nulls_last {
            select.order_by_with_nulls(col, order, NullOrdering::Last);
        } else {
            select.order_by(col, order);
        }

        // Stable pagination across equal sort values.
        if sort.column != Column::Id {
            select.order_by(
                (Alias::new(PRODUCT_TABLE), Alias::new(Column::Id.as_str())),
                Order::Asc,
            );
        }
    }
}

/// Translate a predicate tree into a SeaQuery expression.
fn condition(predicate: &Predicate) -> SimpleExpr {
    match predicate {
        Predicate::All(parts) if parts.is_empty() => Expr::cust("TRUE"),
        // An empty disjunction restricts rather than widens.
        Predicate::Any(parts) if parts.is_empty() => Expr::cust("FALSE"),
        Predicate::All(parts) => parts
            .iter()
            .fold(Cond::all(), |cond, p| cond.add(condition(p)))
            .into(),
        Predicate::Any(parts) => parts
            .iter()
            .fold(Cond::any(), |cond, p| cond.add(condition(p)))
            .into(),
        Predicate::Range { field, min, max } => {
            let expr = numeric_expr(*field);
            match (min, max) {
                (Some(min), Some(max)) => Cond::all()
                    .add(expr.clone().gte(value(*min)))
                    .add(expr.lte(value(*max)))
                    .into(),
                (Some(min), None) => expr.gte(value(*min)),
                (None, Some(max)) => expr.lte(value(*max)),
                (None, None) => Expr::cust("TRUE"),
            }
        }
        Predicate::OneOf { field, values } if values.is_empty() => Expr::cust("FALSE"),
        // Stored conditions are matched the way the catalog reads them.
        Predicate::OneOf {
            field: field @ Field::Column(Column::Condition),
            values,
        } => Expr::cust(format!("LOWER(btrim({}))", text_sql(*field))).is_in(values.clone()),
        Predicate::OneOf { field, values } => text_expr(*field).is_in(values.clone()),
        Predicate::Flag { field, value } => match field {
            Field::Column(c) => column(*c).eq(*value),
            Field::Spec(key) => spec_text(key).eq(if *value { "true" } else { "false" }),
        },
        Predicate::Contains { field, needle } => {
            let pattern = format!("%{}%", escape_like_wildcards(&needle.to_lowercase()));
            Expr::cust(format!("LOWER({})", text_sql(*field))).like(pattern)
        }
        Predicate::SpecEquals { key, value } => match value.parse::<f64>() {
            Ok(number) => spec_leading_number(key).eq(number),
            Err(_) => Expr::cust("FALSE"),
        },
    }
}

fn column(c: Column) -> SimpleExpr {
    Expr::col((Alias::new(PRODUCT_TABLE), Alias::new(c.as_str()))).into()
}

fn value(n: Number) -> Value {
    match n {
        Number::Int(i) => i.into(),
        Number::Float(f) => f.into(),
    }
}

/// `product.specs->>'key'`
fn spec_text(key: &str) -> SimpleExpr {
    Expr::cust(spec_text_sql(key))
}

fn spec_text_sql(key: &str) -> String {
    format!("({PRODUCT_TABLE}.specs->>'{key}')")
}

/// Leading numeric part of a spec value ("16GB" reads as 16).
fn spec_leading_number(key: &str) -> SimpleExpr {
    Expr::cust(format!(
        "(substring(btrim({}) from '^[0-9]+(?:\\.[0-9]+)?'))::numeric",
        spec_text_sql(key)
    ))
}

fn numeric_expr(field: Field) -> SimpleExpr {
    match field {
        Field::Column(c) => column(c),
        Field::Spec(key) => spec_leading_number(key),
    }
}

fn text_expr(field: Field) -> SimpleExpr {
    match field {
        Field::Column(c) => column(c),
        Field::Spec(key) => spec_text(key),
    }
}

fn text_sql(field: Field) -> String {
    match field {
        Field::Column(c) => format!("{PRODUCT_TABLE}.{}", c.as_str()),
        Field::Spec(key) => spec_text_sql(key),
    }
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategoryScope;
    use crate::filter::{Condition, FilterSelection, SortKey};
    use crate::query::QueryCompiler;

    fn compile(selection: &FilterSelection, category: &str, page: u32) -> CatalogQuery {
        QueryCompiler::new(24).compile(selection, &CategoryScope::resolve(category), page)
    }

    #[test]
    fn scope_sort_and_pagination() {
        let mut s = FilterSelection::default();
        s.set_sort_by(Some(SortKey::PriceAsc));
        let sql = CatalogSqlBuilder::new(&compile(&s, "desktops", 2)).build();

        assert!(sql.contains(r#""product"."category" IN ('desktops', 'gaming-desktops'"#));
        assert!(sql.contains(r#"ORDER BY "product"."price" ASC, "product"."id" ASC"#));
        assert!(sql.contains("LIMIT 24"));
        assert!(sql.contains("OFFSET 24"));
    }

    #[test]
    fn newest_puts_missing_dates_last() {
        let sql = CatalogSqlBuilder::new(&compile(&FilterSelection::default(), "ram", 1)).build();
        assert!(sql.contains(r#""product"."created_at" DESC NULLS LAST"#));
    }

    #[test]
    fn facets_render_as_conditions() {
        let mut s = FilterSelection::default();
        s.toggle_brand("Dell");
        s.toggle_brand("HP");
        s.set_price_range(Some(100), Some(900));
        s.set_has_gpu(Some(true));
        let sql = CatalogSqlBuilder::new(&compile(&s, "desktops", 1)).build();

        assert!(sql.contains(r#""product"."brand" IN ('Dell', 'HP')"#));
        assert!(sql.contains(r#""product"."price" >= 100"#));
        assert!(sql.contains(r#""product"."price" <= 900"#));
        assert!(sql.contains("(product.specs->>'dedicated_gpu') = 'true'"));
    }

    #[test]
    fn condition_matches_ignore_case() {
        let mut s = FilterSelection::default();
        s.toggle_condition(Condition::Refurbished);
        let sql = CatalogSqlBuilder::new(&compile(&s, "laptops", 1)).build();

        assert!(sql.contains("LOWER(btrim(product.condition)) IN ('refurbished')"));
    }

    #[test]
    fn search_escapes_like_wildcards() {
        let mut s = FilterSelection::default();
        s.set_search_query(Some("100%_Off"));
        let sql = CatalogSqlBuilder::new(&compile(&s, "laptops", 1)).build();

        assert!(sql.contains("LOWER(product.name) LIKE"));
        assert!(sql.contains(r"\%"));
        assert!(sql.contains(r"\_off"));
    }

    #[test]
    fn count_has_no_ordering() {
        let mut s = FilterSelection::default();
        s.set_in_stock(Some(true));
        let sql = CatalogSqlBuilder::new(&compile(&s, "laptops", 3)).build_count();

        assert!(sql.starts_with("SELECT COUNT(*)"));
        assert!(sql.contains(r#""product"."stock_quantity" >= 1"#));
        assert!(!sql.contains("ORDER BY"));
        assert!(!sql.contains("LIMIT"));
    }

    #[test]
    fn escape_like_wildcards_works() {
        assert_eq!(escape_like_wildcards("50%"), "50\\%");
        assert_eq!(escape_like_wildcards("a_b"), "a\\_b");
        assert_eq!(escape_like_wildcards("c\\d"), "c\\\\d");
    }
}
