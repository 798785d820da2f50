//! Catalog filter test utilities.
//!
//! Helpers for integration testing: product fixture builders, a sample
//! catalog spanning every category kind, and JSON assertion helpers.
//!
//! Fixtures are plain JSON so they load through the same deserializer as
//! production catalog rows.

use serde_json::{Map, Value as JsonValue, json};
use uuid::Uuid;

/// Create a test product with default values: new, in stock, no warranty,
/// no rating, empty specs.
pub fn test_product(name: &str, category: &str, price: i64) -> TestProduct {
    TestProduct {
        id: Uuid::now_v7(),
        name: name.to_string(),
        brand: None,
        condition: Some("new".to_string()),
        category: category.to_string(),
        price,
        original_price: None,
        stock_quantity: 5,
        has_warranty: false,
        rating: None,
        description: None,
        specs: Map::new(),
        created_at: None,
    }
}

/// A product fixture builder.
#[derive(Debug, Clone)]
pub struct TestProduct {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub condition: Option<String>,
    pub category: String,
    pub price: i64,
    pub original_price: Option<i64>,
    pub stock_quantity: i32,
    pub has_warranty: bool,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub specs: Map<String, JsonValue>,
    pub created_at: Option<String>,
}

impl TestProduct {
    /// Set a custom ID.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_brand(mut self, brand: &str) -> Self {
        self.brand = Some(brand.to_string());
        self
    }

    /// Set the condition slug ("new", "refurbished", "used").
    pub fn with_condition(mut self, condition: &str) -> Self {
        self.condition = Some(condition.to_string());
        self
    }

    pub fn with_original_price(mut self, original_price: i64) -> Self {
        self.original_price = Some(original_price);
        self
    }

    pub fn out_of_stock(mut self) -> Self {
        self.stock_quantity = 0;
        self
    }

    pub fn with_warranty(mut self) -> Self {
        self.has_warranty = true;
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Add one spec bag entry.
    pub fn with_spec(mut self, key: &str, value: JsonValue) -> Self {
        self.specs.insert(key.to_string(), value);
        self
    }

    /// Set the creation timestamp (RFC 3339).
    pub fn created(mut self, timestamp: &str) -> Self {
        self.created_at = Some(timestamp.to_string());
        self
    }

    /// The product as a catalog row.
    pub fn to_json(&self) -> JsonValue {
        json!({
            "id": self.id,
            "name": self.name,
            "slug": self.name.to_lowercase().replace(' ', "-"),
            "brand": self.brand,
            "condition": self.condition,
            "category": self.category,
            "price": self.price,
            "original_price": self.original_price,
            "stock_quantity": self.stock_quantity,
            "has_warranty": self.has_warranty,
            "rating": self.rating,
            "description": self.description,
            "specs": self.specs,
            "created_at": self.created_at,
        })
    }
}

/// Serialize fixtures as a JSON array of catalog rows.
pub fn catalog_json(products: &[TestProduct]) -> String {
    JsonValue::Array(products.iter().map(TestProduct::to_json).collect()).to_string()
}

/// Sample catalog fixtures.
pub mod fixtures {
    use super::{TestProduct, test_product};
    use serde_json::json;

    /// Laptops across the laptop category tree.
    pub fn laptops() -> Vec<TestProduct> {
        vec![
            test_product("XPS 15", "laptops", 1800)
                .with_brand("Dell")
                .with_original_price(2100)
                .with_rating(4.6)
                .with_warranty()
                .with_description("Creator laptop with OLED display")
                .with_spec("processor", json!("Intel Core i7-13700H"))
                .with_spec("ram_gb", json!(16))
                .with_spec("storage_type", json!("1TB NVMe SSD"))
                .with_spec("screen_size", json!(15.6))
                .with_spec("graphics", json!("NVIDIA RTX 4050"))
                .created("2024-05-01T00:00:00Z"),
            test_product("Latitude 5440", "business-laptops", 900)
                .with_brand("Dell")
                .with_condition("refurbished")
                .with_original_price(1300)
                .with_rating(4.1)
                .with_spec("processor", json!("Intel Core i5-1345U"))
                .with_spec("ram_gb", json!("16GB"))
                .with_spec("storage_type", json!("512GB SSD"))
                .with_spec("screen_size", json!("14"))
                .with_spec("graphics", json!("Intel Iris Xe"))
                .created("2023-11-15T00:00:00Z"),
            test_product("EliteBook 840", "business-laptops", 700)
                .with_brand("HP")
                .with_condition("used")
                .with_rating(3.9)
                .with_spec("processor", json!("Intel Core i5-1145G7"))
                .with_spec("ram_gb", json!(8))
                .with_spec("storage_type", json!("256GB SSD + 1TB HDD"))
                .with_spec("screen_size", json!(14))
                .created("2023-02-01T00:00:00Z"),
            test_product("ROG Strix G16", "gaming-laptops", 2200)
                .with_brand("ASUS")
                .with_rating(4.8)
                .with_spec("processor", json!("AMD Ryzen 9 7945HX"))
                .with_spec("ram_gb", json!(32))
                .with_spec("storage_type", json!("2TB SSD"))
                .with_spec("screen_size", json!(16))
                .with_spec("graphics", json!("NVIDIA RTX 4070"))
                .created("2024-08-20T00:00:00Z"),
            test_product("MacBook Air", "ultrabooks", 1100)
                .with_brand("Apple")
                .out_of_stock()
                .with_spec("processor", json!("Apple M2"))
                .with_spec("ram_gb", json!(8))
                .with_spec("storage_type", json!("256GB SSD"))
                .with_spec("screen_size", json!(13.6)),
        ]
    }

    /// Desktops across the desktop category tree.
    pub fn desktops() -> Vec<TestProduct> {
        vec![
            test_product("Legion Tower 5", "gaming-desktops", 1500)
                .with_brand("Lenovo")
                .with_rating(4.4)
                .with_spec("cpu", json!("AMD Ryzen 7 7700"))
                .with_spec("ram_gb", json!(32))
                .with_spec("dedicated_gpu", json!(true))
                .created("2024-03-01T00:00:00Z"),
            test_product("OptiPlex 7010", "workstations", 650)
                .with_brand("Dell")
                .with_condition("refurbished")
                .with_spec("cpu", json!("Intel Core i5-13500"))
                .with_spec("ram_gb", json!(16))
                .with_spec("dedicated_gpu", json!("false"))
                .created("2023-06-01T00:00:00Z"),
        ]
    }

    /// PC components.
    pub fn components() -> Vec<TestProduct> {
        vec![
            test_product("Vengeance 32GB", "ram", 110)
                .with_brand("Corsair")
                .with_rating(4.7)
                .with_spec("ram_type", json!("DDR5"))
                .created("2024-01-10T00:00:00Z"),
            test_product("990 PRO 2TB", "ssd", 180)
                .with_brand("Samsung")
                .with_original_price(250)
                .with_spec("ssd_type", json!("NVMe M.2"))
                .created("2024-02-10T00:00:00Z"),
            test_product("RM850x", "psu", 140)
                .with_brand("Corsair")
                .with_warranty()
                .with_spec("psu_certification", json!("80+ Gold"))
                .created("2023-09-10T00:00:00Z"),
        ]
    }

    /// Every fixture above.
    pub fn catalog() -> Vec<TestProduct> {
        let mut all = laptops();
        all.extend(desktops());
        all.extend(components());
        all
    }
}

/// Assertion helpers for JSON responses.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{}', got: {}",
            key,
            value
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{}'\nActual: {}",
            needle,
            haystack
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{}'\nActual: {}",
            needle,
            haystack
        );
    }
}
