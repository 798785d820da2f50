//! Address-text codec.
//!
//! Maps a [`FilterSelection`] to and from a flat query string such as
//! `brands=Dell,HP&conditions=refurbished&priceMin=1000`. Encoding is
//! canonical (fixed key order, sorted set members, absent fields omitted)
//! so that `decode(encode(s)) == s.normalized()`.
//!
//! Decoding is total: unknown keys, malformed numbers, unknown enum members
//! and broken escapes are dropped, never reported.
//!
//! Laptop keys are unprefixed (the legacy convention); desktop keys use the
//! `d_` prefix and component keys the `c_` prefix.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::str::FromStr;

use tracing::trace;

use super::types::{
    CategoryExtension, ComponentFilters, DesktopFilters, ExtensionKind, FilterSelection,
    LaptopFilters,
};

/// Address-text key namespace.
pub mod keys {
    pub const PRICE_MIN: &str = "priceMin";
    pub const PRICE_MAX: &str = "priceMax";
    pub const BRANDS: &str = "brands";
    pub const CONDITIONS: &str = "conditions";
    pub const IN_STOCK: &str = "inStock";
    pub const HAS_WARRANTY: &str = "hasWarranty";
    pub const MIN_RATING: &str = "minRating";
    pub const PROCESSOR_TYPES: &str = "processorTypes";
    pub const RAM_SIZES: &str = "ramSizes";
    pub const STORAGE_TYPES: &str = "storageTypes";
    pub const SCREEN_SIZES: &str = "screenSizes";
    pub const GRAPHICS_TYPES: &str = "graphicsTypes";
    pub const DESKTOP_CPU: &str = "d_cpu";
    pub const DESKTOP_RAM: &str = "d_ram";
    pub const DESKTOP_GPU: &str = "d_gpu";
    pub const COMPONENT_RAM_TYPE: &str = "c_ramType";
    pub const COMPONENT_SSD_TYPE: &str = "c_ssdType";
    pub const COMPONENT_PSU_CERT: &str = "c_psuCert";
    pub const SORT_BY: &str = "sortBy";
    pub const SEARCH: &str = "q";
}

/// Separator between the members of a multi-valued field.
const MEMBER_SEPARATOR: &str = ",";

/// Encode a selection as address text. The selection is normalized first.
pub fn encode(selection: &FilterSelection) -> String {
    let selection = selection.clone().normalized();
    let mut pairs: Vec<(&'static str, String)> = Vec::new();

    push_set(&mut pairs, keys::BRANDS, selection.brands.iter().map(String::as_str));
    push_set(
        &mut pairs,
        keys::CONDITIONS,
        selection.conditions.iter().map(|c| c.as_str()),
    );
    push_scalar(&mut pairs, keys::PRICE_MIN, selection.price_min);
    push_scalar(&mut pairs, keys::PRICE_MAX, selection.price_max);
    push_scalar(&mut pairs, keys::IN_STOCK, selection.in_stock);
    push_scalar(&mut pairs, keys::HAS_WARRANTY, selection.has_warranty);
    push_scalar(&mut pairs, keys::MIN_RATING, selection.min_rating);

    match &selection.extension {
        Some(CategoryExtension::Laptop(l)) => {
            push_set(
                &mut pairs,
                keys::PROCESSOR_TYPES,
                l.processor_types.iter().map(|p| p.as_str()),
            );
            push_owned_set(&mut pairs, keys::RAM_SIZES, l.ram_sizes.iter());
            push_set(
                &mut pairs,
                keys::STORAGE_TYPES,
                l.storage_types.iter().map(|s| s.as_str()),
            );
            push_owned_set(&mut pairs, keys::SCREEN_SIZES, l.screen_sizes.iter());
            push_set(
                &mut pairs,
                keys::GRAPHICS_TYPES,
                l.graphics_types.iter().map(String::as_str),
            );
        }
        Some(CategoryExtension::Desktop(d)) => {
            push_set(&mut pairs, keys::DESKTOP_CPU, d.cpu_types.iter().map(String::as_str));
            push_owned_set(&mut pairs, keys::DESKTOP_RAM, d.ram_sizes.iter());
            push_scalar(&mut pairs, keys::DESKTOP_GPU, d.has_gpu);
        }
        Some(CategoryExtension::Component(c)) => {
            push_set(
                &mut pairs,
                keys::COMPONENT_RAM_TYPE,
                c.ram_types.iter().map(String::as_str),
            );
            push_set(
                &mut pairs,
                keys::COMPONENT_SSD_TYPE,
                c.ssd_types.iter().map(String::as_str),
            );
            push_set(
                &mut pairs,
                keys::COMPONENT_PSU_CERT,
                c.psu_certifications.iter().map(String::as_str),
            );
        }
        None => {}
    }

    if let Some(sort) = selection.sort_by {
        pairs.push((keys::SORT_BY, sort.as_str().to_string()));
    }
    if let Some(ref q) = selection.search_query {
        pairs.push((keys::SEARCH, urlencoding::encode(q).into_owned()));
    }

    pairs
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Decode address text without a category context.
///
/// If keys for more than one extension block are present, the first
/// populated block in the order laptop, desktop, component is kept.
pub fn decode(text: &str) -> FilterSelection {
    decode_for_kind(text, None)
}

/// Decode address text for a listing whose category uses `kind`.
///
/// Extension keys belonging to other kinds are ignored. With `None`,
/// behaves like [`decode`].
pub fn decode_for_kind(text: &str, kind: Option<ExtensionKind>) -> FilterSelection {
    let mut selection = FilterSelection::default();
    let mut laptop = LaptopFilters::default();
    let mut desktop = DesktopFilters::default();
    let mut component = ComponentFilters::default();

    let text = text.trim().trim_start_matches('?');
    for fragment in text.split('&').filter(|f| !f.is_empty()) {
        let Some((raw_key, raw_value)) = fragment.split_once('=') else {
            trace!(fragment, "address fragment without value ignored");
            continue;
        };
        let Some(key) = unescape(raw_key) else {
            continue;
        };

        match key.as_str() {
            keys::PRICE_MIN => set_scalar(&mut selection.price_min, raw_value),
            keys::PRICE_MAX => set_scalar(&mut selection.price_max, raw_value),
            keys::BRANDS => extend_text(&mut selection.brands, raw_value),
            keys::CONDITIONS => extend_parsed(&mut selection.conditions, raw_value),
            keys::IN_STOCK => set_flag(&mut selection.in_stock, raw_value),
            keys::HAS_WARRANTY => set_flag(&mut selection.has_warranty, raw_value),
            keys::MIN_RATING => {
                if let Some(rating) = parse_scalar::<f64>(raw_value)
                    && rating.is_finite()
                    && rating >= 0.0
                {
                    selection.min_rating = Some(rating);
                }
            }
            keys::SORT_BY => set_scalar(&mut selection.sort_by, raw_value),
            keys::SEARCH => {
                if let Some(q) = unescape(raw_value) {
                    selection.search_query = Some(q);
                }
            }
            keys::PROCESSOR_TYPES => extend_parsed(&mut laptop.processor_types, raw_value),
            keys::RAM_SIZES => extend_sizes(&mut laptop.ram_sizes, raw_value),
            keys::STORAGE_TYPES => extend_parsed(&mut laptop.storage_types, raw_value),
            keys::SCREEN_SIZES => extend_parsed(&mut laptop.screen_sizes, raw_value),
            keys::GRAPHICS_TYPES => extend_text(&mut laptop.graphics_types, raw_value),
            keys::DESKTOP_CPU => extend_text(&mut desktop.cpu_types, raw_value),
            keys::DESKTOP_RAM => extend_sizes(&mut desktop.ram_sizes, raw_value),
            keys::DESKTOP_GPU => set_flag(&mut desktop.has_gpu, raw_value),
            keys::COMPONENT_RAM_TYPE => extend_text(&mut component.ram_types, raw_value),
            keys::COMPONENT_SSD_TYPE => extend_text(&mut component.ssd_types, raw_value),
            keys::COMPONENT_PSU_CERT => {
                extend_text(&mut component.psu_certifications, raw_value);
            }
            other => trace!(key = other, "unknown address key ignored"),
        }
    }

    let laptop = CategoryExtension::Laptop(laptop);
    let desktop = CategoryExtension::Desktop(desktop);
    let component = CategoryExtension::Component(component);
    selection.extension = match kind {
        Some(ExtensionKind::Laptop) => Some(laptop),
        Some(ExtensionKind::Desktop) => Some(desktop),
        Some(ExtensionKind::Component) => Some(component),
        None => [laptop, desktop, component]
            .into_iter()
            .find(|block| !block.is_empty()),
    };

    selection.normalized()
}

fn push_scalar<T: ToString>(
    pairs: &mut Vec<(&'static str, String)>,
    key: &'static str,
    value: Option<T>,
) {
    if let Some(value) = value {
        pairs.push((key, value.to_string()));
    }
}

fn push_set<'a>(
    pairs: &mut Vec<(&'static str, String)>,
    key: &'static str,
    members: impl Iterator<Item = &'a str>,
) {
    let joined = members
        .map(|m| urlencoding::encode(m).into_owned())
        .collect::<Vec<_>>()
        .join(MEMBER_SEPARATOR);
    if !joined.is_empty() {
        pairs.push((key, joined));
    }
}

fn push_owned_set<T: ToString>(
    pairs: &mut Vec<(&'static str, String)>,
    key: &'static str,
    members: impl Iterator<Item = T>,
) {
    let rendered: Vec<String> = members.map(|m| m.to_string()).collect();
    push_set(pairs, key, rendered.iter().map(String::as_str));
}

/// Percent-decode one component, reading `+` as a space.
fn unescape(raw: &str) -> Option<String> {
    let spaced: Cow<'_, str> = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };
    urlencoding::decode(&spaced).ok().map(Cow::into_owned)
}

fn parse_scalar<T: FromStr>(raw: &str) -> Option<T> {
    unescape(raw)?.trim().parse().ok()
}

/// Overwrite `slot` only when the new value parses.
fn set_scalar<T: FromStr>(slot: &mut Option<T>, raw: &str) {
    if let Some(value) = parse_scalar(raw) {
        *slot = Some(value);
    }
}

fn set_flag(slot: &mut Option<bool>, raw: &str) {
    match unescape(raw).as_deref().map(str::trim) {
        Some("true") => *slot = Some(true),
        Some("false") => *slot = Some(false),
        _ => {}
    }
}

fn members(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(MEMBER_SEPARATOR)
        .filter_map(unescape)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

fn extend_text(set: &mut BTreeSet<String>, raw: &str) {
    set.extend(members(raw));
}

fn extend_parsed<T: FromStr + Ord>(set: &mut BTreeSet<T>, raw: &str) {
    set.extend(members(raw).filter_map(|m| m.parse().ok()));
}

fn extend_sizes(set: &mut BTreeSet<u32>, raw: &str) {
    set.extend(
        members(raw)
            .filter_map(|m| m.parse::<u32>().ok())
            .filter(|gb| *gb > 0),
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::filter::types::{Condition, ProcessorType, ScreenSize, SortKey, StorageType};

    fn full_laptop_selection() -> FilterSelection {
        let mut s = FilterSelection::default();
        s.toggle_brand("Dell");
        s.toggle_brand("Lenovo");
        s.toggle_condition(Condition::New);
        s.toggle_condition(Condition::Used);
        s.set_price_range(Some(300), Some(2500));
        s.set_in_stock(Some(true));
        s.set_has_warranty(Some(false));
        s.set_min_rating(Some(4.5));
        s.set_sort_by(Some(SortKey::PriceDesc));
        s.set_search_query(Some("thin & light, 2024"));
        s.toggle_processor_type(ProcessorType::IntelI7);
        s.toggle_processor_type(ProcessorType::Ryzen7);
        s.toggle_laptop_ram_size(32);
        s.toggle_laptop_ram_size(16);
        s.toggle_storage_type(StorageType::Both);
        s.toggle_screen_size(ScreenSize::from_tenths(156).unwrap());
        s.toggle_screen_size(ScreenSize::from_tenths(140).unwrap());
        s.toggle_graphics_type("RTX 4060");
        s
    }

    #[test]
    fn encodes_documented_example() {
        let mut s = FilterSelection::default();
        s.toggle_brand("Dell");
        s.toggle_brand("HP");
        s.toggle_condition(Condition::Refurbished);
        s.set_price_range(Some(1000), Some(5000));

        let text = encode(&s);
        assert!(
            text.contains("brands=Dell,HP&conditions=refurbished&priceMin=1000&priceMax=5000"),
            "unexpected encoding: {text}"
        );
    }

    #[test]
    fn empty_selection_encodes_to_empty_text() {
        assert_eq!(encode(&FilterSelection::default()), "");
        assert_eq!(decode(""), FilterSelection::default());
    }

    #[test]
    fn laptop_selection_round_trips() {
        let s = full_laptop_selection();
        let text = encode(&s);
        assert_eq!(decode(&text), s);
        assert_eq!(decode_for_kind(&text, Some(ExtensionKind::Laptop)), s);
    }

    #[test]
    fn desktop_and_component_selections_round_trip() {
        let mut desktop = FilterSelection::default();
        desktop.toggle_cpu_type("Intel Core i9-14900K");
        desktop.toggle_desktop_ram_size(64);
        desktop.set_has_gpu(Some(false));
        let text = encode(&desktop);
        assert!(text.contains("d_gpu=false"));
        assert_eq!(decode(&text), desktop);

        let mut component = FilterSelection::default();
        component.toggle_ram_type("DDR5");
        component.toggle_ssd_type("NVMe");
        component.toggle_psu_certification("80+ Gold");
        let text = encode(&component);
        assert!(text.starts_with("c_ramType=DDR5"));
        assert_eq!(decode(&text), component);
    }

    #[test]
    fn members_with_separator_round_trip() {
        let mut s = FilterSelection::default();
        s.toggle_brand("Acme, Inc.");
        s.toggle_brand("HP");

        let text = encode(&s);
        assert_eq!(text, "brands=Acme%2C%20Inc.,HP");
        assert_eq!(decode(&text), s);
    }

    #[test]
    fn malformed_price_is_dropped() {
        let s = decode("priceMin=abc&brands=Dell");
        let mut expected = FilterSelection::default();
        expected.toggle_brand("Dell");
        assert_eq!(s, expected);
    }

    #[test]
    fn malformed_fragments_never_fail() {
        let s = decode("?&=&minRating=NaN&inStock=yes&sortBy=cheapest&brands=%E0%A4%A&junk");
        assert!(s.is_empty());
    }

    #[test]
    fn unknown_keys_and_members_are_ignored() {
        let s = decode("colour=red&conditions=new,mint&processorTypes=intel-i5,pentium");
        assert_eq!(s.conditions.len(), 1);
        assert!(s.conditions.contains(&Condition::New));
        let laptop = s.laptop().unwrap();
        assert_eq!(laptop.processor_types.len(), 1);
    }

    #[test]
    fn plus_reads_as_space_in_search() {
        let s = decode("q=gaming+laptop");
        assert_eq!(s.search_query.as_deref(), Some("gaming laptop"));
    }

    #[test]
    fn inverted_price_bounds_are_swapped_on_decode() {
        let s = decode("priceMin=900&priceMax=100");
        assert_eq!(s.price_min, Some(100));
        assert_eq!(s.price_max, Some(900));
    }

    #[test]
    fn repeated_keys_union_sets_and_keep_last_scalar() {
        let s = decode("brands=Dell&brands=HP&priceMin=10&priceMin=oops&priceMin=20");
        assert_eq!(s.brands.len(), 2);
        assert_eq!(s.price_min, Some(20));
    }

    #[test]
    fn conflicting_blocks_resolve_by_kind() {
        let text = "ramSizes=16&d_ram=32&c_ramType=DDR4";

        let default = decode(text);
        assert!(default.laptop().is_some());

        let desktop = decode_for_kind(text, Some(ExtensionKind::Desktop));
        assert!(desktop.desktop().unwrap().ram_sizes.contains(&32));

        let component = decode_for_kind(text, Some(ExtensionKind::Component));
        assert!(component.component().unwrap().ram_types.contains("DDR4"));
    }

    #[test]
    fn empty_values_are_absent() {
        let s = decode("brands=&conditions=,&ramSizes=0&q=");
        assert!(s.is_empty());
        assert_eq!(encode(&s), "");
    }
}
