//! Filter model types.
//!
//! Provides the canonical representation of a listing's active selection:
//! - FilterSelection: price bounds, brands, conditions, flags, sort, search
//! - CategoryExtension: the laptop/desktop/component attribute blocks
//! - Slug enums (Condition, SortKey, ProcessorType, StorageType, FilterKey)
//!
//! Multi-valued facets are `BTreeSet`s: an empty set *is* the absent state,
//! which keeps serialization canonical and ordering deterministic.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A slug that does not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a `Copy` enum addressed by a fixed slug with a display label.
macro_rules! slug_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $slug:literal, $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $slug)] $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Slug used in address text and API payloads.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $slug,)+
                }
            }

            /// Human-readable label.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($slug => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

slug_enum! {
    /// Product condition.
    pub enum Condition ("condition") {
        New => "new", "New",
        Refurbished => "refurbished", "Refurbished",
        Used => "used", "Used",
    }
}

slug_enum! {
    /// Listing sort order. Absence means [`SortKey::Newest`].
    #[derive(Default)]
    pub enum SortKey ("sort key") {
        PriceAsc => "price-asc", "Price: low to high",
        PriceDesc => "price-desc", "Price: high to low",
        #[default]
        Newest => "newest", "Newest",
        BestSelling => "best-selling", "Best selling",
        HighestRated => "highest-rated", "Highest rated",
        BiggestDiscount => "biggest-discount", "Biggest discount",
    }
}

slug_enum! {
    /// Laptop processor family.
    pub enum ProcessorType ("processor type") {
        IntelI3 => "intel-i3", "Intel Core i3",
        IntelI5 => "intel-i5", "Intel Core i5",
        IntelI7 => "intel-i7", "Intel Core i7",
        IntelI9 => "intel-i9", "Intel Core i9",
        Ryzen3 => "ryzen-3", "AMD Ryzen 3",
        Ryzen5 => "ryzen-5", "AMD Ryzen 5",
        Ryzen7 => "ryzen-7", "AMD Ryzen 7",
        Ryzen9 => "ryzen-9", "AMD Ryzen 9",
        AppleM1 => "apple-m1", "Apple M1",
        AppleM2 => "apple-m2", "Apple M2",
        AppleM3 => "apple-m3", "Apple M3",
    }
}

impl ProcessorType {
    /// Lowercase substring that identifies this family in a free-text
    /// processor description ("Intel Core i5-1235U", "AMD Ryzen 7 5800H").
    pub fn needle(self) -> &'static str {
        match self {
            ProcessorType::IntelI3 => "i3",
            ProcessorType::IntelI5 => "i5",
            ProcessorType::IntelI7 => "i7",
            ProcessorType::IntelI9 => "i9",
            ProcessorType::Ryzen3 => "ryzen 3",
            ProcessorType::Ryzen5 => "ryzen 5",
            ProcessorType::Ryzen7 => "ryzen 7",
            ProcessorType::Ryzen9 => "ryzen 9",
            ProcessorType::AppleM1 => "m1",
            ProcessorType::AppleM2 => "m2",
            ProcessorType::AppleM3 => "m3",
        }
    }

    /// Classify a processor description, first matching family wins.
    pub fn classify(description: &str) -> Option<Self> {
        let lower = description.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|p| lower.contains(p.needle()))
    }
}

slug_enum! {
    /// Laptop storage configuration.
    pub enum StorageType ("storage type") {
        Ssd => "ssd", "SSD",
        Hdd => "hdd", "HDD",
        Both => "both", "SSD + HDD",
    }
}

impl StorageType {
    /// Classify a storage description ("512GB NVMe SSD", "1TB HDD + 256GB SSD").
    pub fn classify(description: &str) -> Option<Self> {
        let lower = description.to_lowercase();
        match (lower.contains("ssd"), lower.contains("hdd")) {
            (true, true) => Some(StorageType::Both),
            (true, false) => Some(StorageType::Ssd),
            (false, true) => Some(StorageType::Hdd),
            (false, false) => None,
        }
    }
}

slug_enum! {
    /// Which category extension block a listing uses.
    pub enum ExtensionKind ("extension kind") {
        Laptop => "laptop", "Laptops",
        Desktop => "desktop", "Desktops",
        Component => "component", "Components",
    }
}

slug_enum! {
    /// Key of one removable chip and of the facet it counts.
    pub enum FilterKey ("filter key") {
        Brand => "brand", "Brand",
        Condition => "condition", "Condition",
        PriceMin => "priceMin", "Min price",
        PriceMax => "priceMax", "Max price",
        InStock => "inStock", "In stock",
        HasWarranty => "hasWarranty", "Warranty",
        MinRating => "minRating", "Rating",
        SortBy => "sortBy", "Sort",
        Search => "q", "Search",
        ProcessorType => "processorType", "Processor",
        LaptopRam => "ramSize", "RAM",
        StorageType => "storageType", "Storage",
        ScreenSize => "screenSize", "Screen size",
        GraphicsType => "graphicsType", "Graphics",
        CpuType => "cpuType", "CPU",
        DesktopRam => "desktopRam", "RAM",
        HasGpu => "hasGpu", "Dedicated GPU",
        RamType => "ramType", "RAM type",
        SsdType => "ssdType", "SSD type",
        PsuCert => "psuCert", "PSU certification",
    }
}

/// Screen diagonal in tenths of an inch (`15.6"` is 156).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ScreenSize(u16);

/// Largest accepted diagonal, in tenths (999.9").
const MAX_SCREEN_TENTHS: u16 = 9_999;

impl ScreenSize {
    /// A diagonal of `tenths` tenths of an inch, from 0.1" to 999.9".
    pub fn from_tenths(tenths: u16) -> Option<Self> {
        (1..=MAX_SCREEN_TENTHS).contains(&tenths).then_some(Self(tenths))
    }

    pub fn tenths(self) -> u16 {
        self.0
    }

    pub fn inches(self) -> f64 {
        f64::from(self.0) / 10.0
    }

    /// Round a diagonal to the nearest tenth; rejects non-positive and
    /// implausible values.
    pub fn from_inches(inches: f64) -> Option<Self> {
        let tenths = (inches * 10.0).round();
        if !tenths.is_finite() || tenths < 1.0 || tenths > f64::from(MAX_SCREEN_TENTHS) {
            return None;
        }
        Self::from_tenths(tenths as u16)
    }
}

impl fmt::Display for ScreenSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 10;
        let frac = self.0 % 10;
        if frac == 0 {
            write!(f, "{whole}")
        } else {
            write!(f, "{whole}.{frac}")
        }
    }
}

impl FromStr for ScreenSize {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('"');
        trimmed
            .parse::<f64>()
            .ok()
            .and_then(Self::from_inches)
            .ok_or_else(|| UnknownVariant {
                kind: "screen size",
                value: s.to_string(),
            })
    }
}

impl TryFrom<f64> for ScreenSize {
    type Error = UnknownVariant;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_inches(value).ok_or_else(|| UnknownVariant {
            kind: "screen size",
            value: value.to_string(),
        })
    }
}

impl From<ScreenSize> for f64 {
    fn from(value: ScreenSize) -> Self {
        value.inches()
    }
}

/// Laptop-specific attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LaptopFilters {
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub processor_types: BTreeSet<ProcessorType>,
    /// RAM sizes in GB.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub ram_sizes: BTreeSet<u32>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub storage_types: BTreeSet<StorageType>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub screen_sizes: BTreeSet<ScreenSize>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub graphics_types: BTreeSet<String>,
}

impl LaptopFilters {
    pub fn is_empty(&self) -> bool {
        self.processor_types.is_empty()
            && self.ram_sizes.is_empty()
            && self.storage_types.is_empty()
            && self.screen_sizes.is_empty()
            && self.graphics_types.is_empty()
    }
}

/// Desktop-specific attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesktopFilters {
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub cpu_types: BTreeSet<String>,
    /// RAM sizes in GB.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub ram_sizes: BTreeSet<u32>,
    #[serde(rename = "hasGPU", skip_serializing_if = "Option::is_none")]
    pub has_gpu: Option<bool>,
}

impl DesktopFilters {
    pub fn is_empty(&self) -> bool {
        self.cpu_types.is_empty() && self.ram_sizes.is_empty() && self.has_gpu.is_none()
    }
}

/// PC component attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentFilters {
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub ram_types: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub ssd_types: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub psu_certifications: BTreeSet<String>,
}

impl ComponentFilters {
    pub fn is_empty(&self) -> bool {
        self.ram_types.is_empty() && self.ssd_types.is_empty() && self.psu_certifications.is_empty()
    }
}

/// The one category-specific attribute block a selection may carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum CategoryExtension {
    Laptop(LaptopFilters),
    Desktop(DesktopFilters),
    Component(ComponentFilters),
}

impl CategoryExtension {
    /// An empty block of the given kind.
    pub fn empty(kind: ExtensionKind) -> Self {
        match kind {
            ExtensionKind::Laptop => CategoryExtension::Laptop(LaptopFilters::default()),
            ExtensionKind::Desktop => CategoryExtension::Desktop(DesktopFilters::default()),
            ExtensionKind::Component => CategoryExtension::Component(ComponentFilters::default()),
        }
    }

    pub fn kind(&self) -> ExtensionKind {
        match self {
            CategoryExtension::Laptop(_) => ExtensionKind::Laptop,
            CategoryExtension::Desktop(_) => ExtensionKind::Desktop,
            CategoryExtension::Component(_) => ExtensionKind::Component,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CategoryExtension::Laptop(l) => l.is_empty(),
            CategoryExtension::Desktop(d) => d.is_empty(),
            CategoryExtension::Component(c) => c.is_empty(),
        }
    }
}

/// The active filter selection of one listing view.
///
/// Every field is optional; absence means "no constraint". Mutations go
/// through the methods in `filter::mutate`, which keep the value
/// normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSelection {
    /// Inclusive lower price bound, in the catalog currency unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_min: Option<i64>,

    /// Inclusive upper price bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_max: Option<i64>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub brands: BTreeSet<String>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub conditions: BTreeSet<Condition>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_warranty: Option<bool>,

    /// Minimum average rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortKey>,

    /// Free-text search, matched independently of facets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<CategoryExtension>,
}

impl FilterSelection {
    /// Whether no field constrains the listing.
    pub fn is_empty(&self) -> bool {
        self.price_min.is_none()
            && self.price_max.is_none()
            && self.brands.is_empty()
            && self.conditions.is_empty()
            && self.in_stock.is_none()
            && self.has_warranty.is_none()
            && self.min_rating.is_none()
            && self.sort_by.is_none()
            && self.search_query.is_none()
            && self.extension.is_none()
    }

    /// Sort key in effect, falling back to the default.
    pub fn effective_sort(&self) -> SortKey {
        self.sort_by.unwrap_or_default()
    }

    /// Canonical form: swapped price bounds, trimmed search text, valid
    /// rating, no empty strings or zero RAM sizes in sets, no empty
    /// extension block.
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// In-place variant of [`FilterSelection::normalized`].
    pub fn normalize(&mut self) {
        if let (Some(min), Some(max)) = (self.price_min, self.price_max)
            && min > max
        {
            self.price_min = Some(max);
            self.price_max = Some(min);
        }

        self.search_query = self
            .search_query
            .take()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        self.min_rating = self.min_rating.filter(|r| r.is_finite() && *r >= 0.0);

        normalize_strings(&mut self.brands);
        match &mut self.extension {
            Some(CategoryExtension::Laptop(l)) => {
                l.ram_sizes.remove(&0);
                normalize_strings(&mut l.graphics_types);
            }
            Some(CategoryExtension::Desktop(d)) => {
                d.ram_sizes.remove(&0);
                normalize_strings(&mut d.cpu_types);
            }
            Some(CategoryExtension::Component(c)) => {
                normalize_strings(&mut c.ram_types);
                normalize_strings(&mut c.ssd_types);
                normalize_strings(&mut c.psu_certifications);
            }
            None => {}
        }
        self.prune_extension();
    }

    /// Drop the extension block once it no longer constrains anything.
    pub fn prune_extension(&mut self) {
        if self.extension.as_ref().is_some_and(CategoryExtension::is_empty) {
            self.extension = None;
        }
    }

    pub fn laptop(&self) -> Option<&LaptopFilters> {
        match &self.extension {
            Some(CategoryExtension::Laptop(l)) => Some(l),
            _ => None,
        }
    }

    pub fn desktop(&self) -> Option<&DesktopFilters> {
        match &self.extension {
            Some(CategoryExtension::Desktop(d)) => Some(d),
            _ => None,
        }
    }

    pub fn component(&self) -> Option<&ComponentFilters> {
        match &self.extension {
            Some(CategoryExtension::Component(c)) => Some(c),
            _ => None,
        }
    }

    /// Edit the laptop block, installing it over a block of another kind.
    /// A block the edit leaves empty is dropped.
    pub fn edit_laptop<R>(&mut self, edit: impl FnOnce(&mut LaptopFilters) -> R) -> R {
        let mut block = match self.extension.take() {
            Some(CategoryExtension::Laptop(l)) => l,
            _ => LaptopFilters::default(),
        };
        let out = edit(&mut block);
        self.extension = Some(CategoryExtension::Laptop(block));
        self.prune_extension();
        out
    }

    /// Desktop counterpart of [`FilterSelection::edit_laptop`].
    pub fn edit_desktop<R>(&mut self, edit: impl FnOnce(&mut DesktopFilters) -> R) -> R {
        let mut block = match self.extension.take() {
            Some(CategoryExtension::Desktop(d)) => d,
            _ => DesktopFilters::default(),
        };
        let out = edit(&mut block);
        self.extension = Some(CategoryExtension::Desktop(block));
        self.prune_extension();
        out
    }

    /// Component counterpart of [`FilterSelection::edit_laptop`].
    pub fn edit_component<R>(&mut self, edit: impl FnOnce(&mut ComponentFilters) -> R) -> R {
        let mut block = match self.extension.take() {
            Some(CategoryExtension::Component(c)) => c,
            _ => ComponentFilters::default(),
        };
        let out = edit(&mut block);
        self.extension = Some(CategoryExtension::Component(block));
        self.prune_extension();
        out
    }
}

/// Trim members and drop the ones that end up empty.
fn normalize_strings(set: &mut BTreeSet<String>) {
    if set.iter().all(|s| !s.is_empty() && s.trim() == s) {
        return;
    }
    *set = std::mem::take(set)
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn selection_defaults_to_empty() {
        let selection = FilterSelection::default();
        assert!(selection.is_empty());
        assert_eq!(selection.effective_sort(), SortKey::Newest);
    }

    #[test]
    fn normalize_swaps_inverted_price_bounds() {
        let selection = FilterSelection {
            price_min: Some(500),
            price_max: Some(100),
            ..Default::default()
        }
        .normalized();

        assert_eq!(selection.price_min, Some(100));
        assert_eq!(selection.price_max, Some(500));
    }

    #[test]
    fn normalize_prunes_blank_search_and_empty_block() {
        let selection = FilterSelection {
            search_query: Some("   ".to_string()),
            extension: Some(CategoryExtension::empty(ExtensionKind::Desktop)),
            ..Default::default()
        }
        .normalized();

        assert!(selection.is_empty());
    }

    #[test]
    fn normalize_trims_set_members() {
        let selection = FilterSelection {
            brands: [" Dell ", "", "HP"].iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
        .normalized();

        let brands: Vec<&str> = selection.brands.iter().map(String::as_str).collect();
        assert_eq!(brands, vec!["Dell", "HP"]);
    }

    #[test]
    fn normalize_drops_zero_ram_sizes() {
        let mut selection = FilterSelection::default();
        selection.edit_desktop(|d| d.ram_sizes.extend([0, 32]));
        let selection = selection.normalized();
        assert_eq!(selection.desktop().unwrap().ram_sizes.len(), 1);

        let mut selection = FilterSelection::default();
        selection.edit_laptop(|l| l.ram_sizes.insert(0));
        assert!(selection.normalized().is_empty());
    }

    #[test]
    fn block_accessor_replaces_other_kind() {
        let mut selection = FilterSelection::default();
        selection.edit_desktop(|d| d.has_gpu = Some(true));
        assert!(selection.desktop().is_some());

        selection.edit_laptop(|l| l.ram_sizes.insert(16));
        assert!(selection.desktop().is_none());
        assert_eq!(
            selection.extension.as_ref().map(CategoryExtension::kind),
            Some(ExtensionKind::Laptop)
        );
    }

    #[test]
    fn slug_enums_parse_and_display() {
        assert_eq!("refurbished".parse::<Condition>(), Ok(Condition::Refurbished));
        assert_eq!(SortKey::BiggestDiscount.to_string(), "biggest-discount");
        assert_eq!("priceMin".parse::<FilterKey>(), Ok(FilterKey::PriceMin));
        assert!("mint".parse::<Condition>().is_err());
    }

    #[test]
    fn processor_classification() {
        assert_eq!(
            ProcessorType::classify("Intel Core i5-1235U"),
            Some(ProcessorType::IntelI5)
        );
        assert_eq!(
            ProcessorType::classify("AMD Ryzen 7 5800H"),
            Some(ProcessorType::Ryzen7)
        );
        assert_eq!(ProcessorType::classify("Snapdragon X"), None);
    }

    #[test]
    fn storage_classification() {
        assert_eq!(StorageType::classify("512GB NVMe SSD"), Some(StorageType::Ssd));
        assert_eq!(
            StorageType::classify("1TB HDD + 256GB SSD"),
            Some(StorageType::Both)
        );
        assert_eq!(StorageType::classify("eMMC"), None);
    }

    #[test]
    fn screen_size_display_and_parse() {
        let size: ScreenSize = "15.6".parse().unwrap();
        assert_eq!(size.tenths(), 156);
        assert_eq!(size.to_string(), "15.6");
        assert_eq!(ScreenSize::from_tenths(140).unwrap().to_string(), "14");
        assert!("large".parse::<ScreenSize>().is_err());
        assert!("-3".parse::<ScreenSize>().is_err());

        assert!(ScreenSize::from_tenths(0).is_none());
        assert!(ScreenSize::from_tenths(10_000).is_none());
        assert_eq!(ScreenSize::from_tenths(9_999).unwrap().to_string(), "999.9");
        assert!("999.96".parse::<ScreenSize>().is_err());
        assert!("0.04".parse::<ScreenSize>().is_err());
        assert_eq!("0.1".parse::<ScreenSize>().unwrap().tenths(), 1);
    }

    #[test]
    fn selection_json_skips_absent_fields() {
        let mut selection = FilterSelection::default();
        selection.brands.insert("Dell".to_string());

        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(json, serde_json::json!({"brands": ["Dell"]}));
    }
}
