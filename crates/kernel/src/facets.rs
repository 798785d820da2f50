//! Facet counts for the fetched page.
//!
//! Counts are computed from the current page only, so they under-count
//! relative to the whole catalog once results span several pages.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::Product;
use crate::catalog::product::spec_keys;
use crate::filter::{ExtensionKind, FilterKey, ProcessorType, ScreenSize, StorageType};

/// Facet name to value to occurrence count. Facet names are chip keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FacetCounts(BTreeMap<String, BTreeMap<String, u64>>);

impl FacetCounts {
    /// Occurrences of one value; zero for unknown facets or values.
    pub fn count(&self, facet: FilterKey, value: &str) -> u64 {
        self.0
            .get(facet.as_str())
            .and_then(|buckets| buckets.get(value))
            .copied()
            .unwrap_or(0)
    }

    /// All buckets of one facet.
    pub fn facet(&self, facet: FilterKey) -> Option<&BTreeMap<String, u64>> {
        self.0.get(facet.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, BTreeMap<String, u64>> {
        &self.0
    }

    fn tally(&mut self, facet: FilterKey, value: Option<String>) {
        if let Some(value) = value {
            *self
                .0
                .entry(facet.as_str().to_string())
                .or_default()
                .entry(value)
                .or_default() += 1;
        }
    }
}

/// Tally brand, condition and the facets of the listing's extension kind.
pub fn aggregate(products: &[Product], kind: Option<ExtensionKind>) -> FacetCounts {
    let mut counts = FacetCounts::default();

    for p in products {
        counts.tally(
            FilterKey::Brand,
            p.brand
                .as_deref()
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(str::to_string),
        );
        counts.tally(
            FilterKey::Condition,
            p.condition.map(|c| c.as_str().to_string()),
        );

        match kind {
            Some(ExtensionKind::Laptop) => {
                counts.tally(
                    FilterKey::ProcessorType,
                    p.spec_text(spec_keys::PROCESSOR)
                        .and_then(|t| ProcessorType::classify(&t))
                        .map(|t| t.as_str().to_string()),
                );
                counts.tally(FilterKey::LaptopRam, ram_bucket(p));
                counts.tally(
                    FilterKey::StorageType,
                    p.spec_text(spec_keys::STORAGE_TYPE)
                        .and_then(|t| StorageType::classify(&t))
                        .map(|t| t.as_str().to_string()),
                );
                counts.tally(
                    FilterKey::ScreenSize,
                    p.spec_number(spec_keys::SCREEN_SIZE)
                        .and_then(ScreenSize::from_inches)
                        .map(|s| s.to_string()),
                );
            }
            Some(ExtensionKind::Desktop) => {
                counts.tally(FilterKey::CpuType, p.spec_text(spec_keys::CPU));
                counts.tally(FilterKey::DesktopRam, ram_bucket(p));
                counts.tally(
                    FilterKey::HasGpu,
                    p.spec_bool(spec_keys::DEDICATED_GPU).map(|b| b.to_string()),
                );
            }
            Some(ExtensionKind::Component) => {
                counts.tally(FilterKey::RamType, p.spec_text(spec_keys::RAM_TYPE));
                counts.tally(FilterKey::SsdType, p.spec_text(spec_keys::SSD_TYPE));
                counts.tally(
                    FilterKey::PsuCert,
                    p.spec_text(spec_keys::PSU_CERTIFICATION),
                );
            }
            None => {}
        }
    }

    counts
}

/// Whole gigabytes only; fractional or non-positive values are skipped.
fn ram_bucket(p: &Product) -> Option<String> {
    let gb = p.spec_number(spec_keys::RAM_GB)?;
    (gb >= 1.0 && gb.fract() == 0.0 && gb <= f64::from(u32::MAX)).then(|| (gb as u32).to_string())
}
