//! Active-filter chips.
//!
//! Derives one removable chip per atomic selected value. Feeding a chip's
//! `key` and `value` back into [`FilterSelection::remove`] removes exactly
//! that value.

use serde::Serialize;

use super::types::{CategoryExtension, FilterKey, FilterSelection};

/// One removable chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFilter {
    /// Chip key, accepted by [`FilterSelection::remove`].
    pub key: FilterKey,
    /// Facet label ("Brand", "RAM").
    pub label: &'static str,
    /// Raw value, accepted by [`FilterSelection::remove`].
    pub value: String,
    /// Value as shown to shoppers.
    pub display_value: String,
}

impl ActiveFilter {
    fn new(key: FilterKey, value: impl Into<String>, display_value: impl Into<String>) -> Self {
        Self {
            key,
            label: key.label(),
            value: value.into(),
            display_value: display_value.into(),
        }
    }

    fn plain(key: FilterKey, value: &str) -> Self {
        Self::new(key, value, value)
    }
}

/// Chips for every selected value, in address-text order.
pub fn active_filters(selection: &FilterSelection) -> Vec<ActiveFilter> {
    let mut chips = Vec::new();

    chips.extend(
        selection
            .brands
            .iter()
            .map(|b| ActiveFilter::plain(FilterKey::Brand, b)),
    );
    chips.extend(
        selection
            .conditions
            .iter()
            .map(|c| ActiveFilter::new(FilterKey::Condition, c.as_str(), c.label())),
    );
    if let Some(min) = selection.price_min {
        chips.push(ActiveFilter::new(
            FilterKey::PriceMin,
            min.to_string(),
            format!("From {min}"),
        ));
    }
    if let Some(max) = selection.price_max {
        chips.push(ActiveFilter::new(
            FilterKey::PriceMax,
            max.to_string(),
            format!("Up to {max}"),
        ));
    }
    if let Some(in_stock) = selection.in_stock {
        let display = if in_stock { "In stock" } else { "Out of stock" };
        chips.push(ActiveFilter::new(FilterKey::InStock, in_stock.to_string(), display));
    }
    if let Some(has_warranty) = selection.has_warranty {
        let display = if has_warranty {
            "With warranty"
        } else {
            "Without warranty"
        };
        chips.push(ActiveFilter::new(
            FilterKey::HasWarranty,
            has_warranty.to_string(),
            display,
        ));
    }
    if let Some(rating) = selection.min_rating {
        chips.push(ActiveFilter::new(
            FilterKey::MinRating,
            rating.to_string(),
            format!("{rating}+ stars"),
        ));
    }

    match &selection.extension {
        Some(CategoryExtension::Laptop(l)) => {
            chips.extend(
                l.processor_types
                    .iter()
                    .map(|p| ActiveFilter::new(FilterKey::ProcessorType, p.as_str(), p.label())),
            );
            chips.extend(l.ram_sizes.iter().map(|gb| {
                ActiveFilter::new(FilterKey::LaptopRam, gb.to_string(), format!("{gb} GB"))
            }));
            chips.extend(
                l.storage_types
                    .iter()
                    .map(|s| ActiveFilter::new(FilterKey::StorageType, s.as_str(), s.label())),
            );
            chips.extend(l.screen_sizes.iter().map(|s| {
                ActiveFilter::new(FilterKey::ScreenSize, s.to_string(), format!("{s}\""))
            }));
            chips.extend(
                l.graphics_types
                    .iter()
                    .map(|g| ActiveFilter::plain(FilterKey::GraphicsType, g)),
            );
        }
        Some(CategoryExtension::Desktop(d)) => {
            chips.extend(
                d.cpu_types
                    .iter()
                    .map(|c| ActiveFilter::plain(FilterKey::CpuType, c)),
            );
            chips.extend(d.ram_sizes.iter().map(|gb| {
                ActiveFilter::new(FilterKey::DesktopRam, gb.to_string(), format!("{gb} GB"))
            }));
            if let Some(has_gpu) = d.has_gpu {
                let display = if has_gpu { "Yes" } else { "No" };
                chips.push(ActiveFilter::new(FilterKey::HasGpu, has_gpu.to_string(), display));
            }
        }
        Some(CategoryExtension::Component(c)) => {
            chips.extend(
                c.ram_types
                    .iter()
                    .map(|t| ActiveFilter::plain(FilterKey::RamType, t)),
            );
            chips.extend(
                c.ssd_types
                    .iter()
                    .map(|t| ActiveFilter::plain(FilterKey::SsdType, t)),
            );
            chips.extend(
                c.psu_certifications
                    .iter()
                    .map(|t| ActiveFilter::plain(FilterKey::PsuCert, t)),
            );
        }
        None => {}
    }

    if let Some(sort) = selection.sort_by {
        chips.push(ActiveFilter::new(FilterKey::SortBy, sort.as_str(), sort.label()));
    }
    if let Some(ref q) = selection.search_query {
        chips.push(ActiveFilter::new(FilterKey::Search, q.clone(), format!("\"{q}\"")));
    }

    chips
}

/// Number of chips [`active_filters`] would produce.
pub fn active_count(selection: &FilterSelection) -> usize {
    active_filters(selection).len()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::filter::types::{Condition, ProcessorType, ScreenSize, SortKey};

    fn sample() -> FilterSelection {
        let mut s = FilterSelection::default();
        s.toggle_brand("Dell");
        s.toggle_brand("HP");
        s.toggle_condition(Condition::Refurbished);
        s.set_price_range(Some(1000), Some(5000));
        s.set_min_rating(Some(4.0));
        s.set_sort_by(Some(SortKey::PriceAsc));
        s.set_search_query(Some("xps"));
        s.toggle_processor_type(ProcessorType::IntelI7);
        s.toggle_laptop_ram_size(16);
        s.toggle_screen_size(ScreenSize::from_tenths(156).unwrap());
        s
    }

    #[test]
    fn empty_selection_has_no_chips() {
        let s = FilterSelection::default();
        assert!(active_filters(&s).is_empty());
        assert_eq!(active_count(&s), 0);
    }

    #[test]
    fn one_chip_per_atomic_value() {
        let s = sample();
        let chips = active_filters(&s);
        assert_eq!(chips.len(), 11);
        assert_eq!(active_count(&s), chips.len());

        let brands: Vec<&str> = chips
            .iter()
            .filter(|c| c.key == FilterKey::Brand)
            .map(|c| c.value.as_str())
            .collect();
        assert_eq!(brands, vec!["Dell", "HP"]);

        let ram = chips.iter().find(|c| c.key == FilterKey::LaptopRam).unwrap();
        assert_eq!(ram.display_value, "16 GB");
        assert_eq!(ram.label, "RAM");
    }

    #[test]
    fn removing_every_chip_empties_selection() {
        let mut s = sample();
        for chip in active_filters(&s.clone()) {
            assert!(
                s.remove(chip.key.as_str(), &chip.value),
                "chip {chip:?} did not remove anything"
            );
        }
        assert!(s.is_empty());
        assert_eq!(active_count(&s), 0);
    }

    #[test]
    fn chip_serializes_with_camel_case_keys() {
        let chip = ActiveFilter::new(FilterKey::PriceMin, "10", "From 10");
        let json = serde_json::to_value(&chip).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "key": "priceMin",
                "label": "Min price",
                "value": "10",
                "displayValue": "From 10"
            })
        );
    }
}
