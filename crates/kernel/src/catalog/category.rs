//! Category taxonomy and listing scope.
//!
//! A listing for a parent category spans the parent and its children. The
//! top-level category decides which extension block applies.

use serde::Serialize;

use crate::filter::ExtensionKind;

/// Top-level categories with their extension kind and child slugs.
const TAXONOMY: &[(&str, ExtensionKind, &[&str])] = &[
    (
        "laptops",
        ExtensionKind::Laptop,
        &["gaming-laptops", "business-laptops", "ultrabooks"],
    ),
    (
        "desktops",
        ExtensionKind::Desktop,
        &["gaming-desktops", "workstations", "all-in-one"],
    ),
    (
        "components",
        ExtensionKind::Component,
        &["ram", "ssd", "psu", "gpu", "cpu", "motherboards"],
    ),
];

/// Categories a listing spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryScope {
    /// The category in view.
    pub root: String,
    /// The root plus its children; empty means the whole catalog.
    pub categories: Vec<String>,
    /// Extension block used by this listing, if any.
    pub kind: Option<ExtensionKind>,
}

impl CategoryScope {
    /// Scope for a category slug. Unknown slugs scope to themselves.
    pub fn resolve(slug: &str) -> Self {
        let slug = slug.trim().to_lowercase();

        for (root, kind, children) in TAXONOMY {
            if *root == slug {
                let mut categories = vec![slug.clone()];
                categories.extend(children.iter().map(|c| c.to_string()));
                return Self {
                    root: slug,
                    categories,
                    kind: Some(*kind),
                };
            }
            if children.contains(&slug.as_str()) {
                return Self {
                    categories: vec![slug.clone()],
                    root: slug,
                    kind: Some(*kind),
                };
            }
        }

        Self {
            categories: vec![slug.clone()],
            root: slug,
            kind: None,
        }
    }

    /// The whole catalog, without an extension block.
    pub fn everything() -> Self {
        Self {
            root: String::new(),
            categories: Vec::new(),
            kind: None,
        }
    }
}
