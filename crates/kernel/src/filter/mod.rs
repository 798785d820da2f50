//! Filter model module.
//!
//! This module provides:
//! - Types: FilterSelection, CategoryExtension, slug enums
//! - Mutations: single-value toggles and setters on FilterSelection
//! - Codec: address-text encode/decode
//! - Chips: the active-filter view

pub mod chips;
pub mod codec;
mod mutate;
pub mod types;

pub use chips::{ActiveFilter, active_count, active_filters};
pub use codec::{decode, decode_for_kind, encode};
pub use types::{
    CategoryExtension, ComponentFilters, Condition, DesktopFilters, ExtensionKind, FilterKey,
    FilterSelection, LaptopFilters, ProcessorType, ScreenSize, SortKey, StorageType,
    UnknownVariant,
};
