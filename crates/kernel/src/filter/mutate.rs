//! Single-value mutations on a [`FilterSelection`].
//!
//! Each method adds or removes exactly the targeted value and leaves the
//! selection normalized: emptied sets read as absent and an emptied
//! extension block is dropped.

use std::collections::BTreeSet;

use super::types::{
    CategoryExtension, ComponentFilters, Condition, DesktopFilters, FilterKey, FilterSelection,
    LaptopFilters, ProcessorType, ScreenSize, SortKey, StorageType,
};

/// Insert `value` if missing, remove it if present.
fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

/// Toggle a free-text member, ignoring blank input.
fn toggle_text(set: &mut BTreeSet<String>, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    toggle(set, value.to_string());
    true
}

impl FilterSelection {
    pub fn toggle_brand(&mut self, brand: &str) {
        toggle_text(&mut self.brands, brand);
    }

    pub fn toggle_condition(&mut self, condition: Condition) {
        toggle(&mut self.conditions, condition);
    }

    /// Set both price bounds; inverted bounds are swapped.
    pub fn set_price_range(&mut self, min: Option<i64>, max: Option<i64>) {
        self.price_min = min;
        self.price_max = max;
        self.normalize();
    }

    pub fn set_price_min(&mut self, min: Option<i64>) {
        self.set_price_range(min, self.price_max);
    }

    pub fn set_price_max(&mut self, max: Option<i64>) {
        self.set_price_range(self.price_min, max);
    }

    pub fn set_in_stock(&mut self, in_stock: Option<bool>) {
        self.in_stock = in_stock;
    }

    pub fn set_has_warranty(&mut self, has_warranty: Option<bool>) {
        self.has_warranty = has_warranty;
    }

    /// Non-finite or negative ratings clear the floor.
    pub fn set_min_rating(&mut self, rating: Option<f64>) {
        self.min_rating = rating.filter(|r| r.is_finite() && *r >= 0.0);
    }

    pub fn set_sort_by(&mut self, sort: Option<SortKey>) {
        self.sort_by = sort;
    }

    /// Blank text clears the search.
    pub fn set_search_query(&mut self, query: Option<&str>) {
        self.search_query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
    }

    pub fn toggle_processor_type(&mut self, processor: ProcessorType) {
        self.edit_laptop(|l| toggle(&mut l.processor_types, processor));
    }

    /// Zero is not a RAM size and is ignored.
    pub fn toggle_laptop_ram_size(&mut self, gigabytes: u32) {
        if gigabytes == 0 {
            return;
        }
        self.edit_laptop(|l| toggle(&mut l.ram_sizes, gigabytes));
    }

    pub fn toggle_storage_type(&mut self, storage: StorageType) {
        self.edit_laptop(|l| toggle(&mut l.storage_types, storage));
    }

    pub fn toggle_screen_size(&mut self, size: ScreenSize) {
        self.edit_laptop(|l| toggle(&mut l.screen_sizes, size));
    }

    pub fn toggle_graphics_type(&mut self, graphics: &str) {
        if graphics.trim().is_empty() {
            return;
        }
        self.edit_laptop(|l| toggle_text(&mut l.graphics_types, graphics));
    }

    pub fn toggle_cpu_type(&mut self, cpu: &str) {
        if cpu.trim().is_empty() {
            return;
        }
        self.edit_desktop(|d| toggle_text(&mut d.cpu_types, cpu));
    }

    /// Zero is not a RAM size and is ignored.
    pub fn toggle_desktop_ram_size(&mut self, gigabytes: u32) {
        if gigabytes == 0 {
            return;
        }
        self.edit_desktop(|d| toggle(&mut d.ram_sizes, gigabytes));
    }

    pub fn set_has_gpu(&mut self, has_gpu: Option<bool>) {
        if has_gpu.is_none() && self.desktop().is_none() {
            return;
        }
        self.edit_desktop(|d| d.has_gpu = has_gpu);
    }

    pub fn toggle_ram_type(&mut self, ram_type: &str) {
        if ram_type.trim().is_empty() {
            return;
        }
        self.edit_component(|c| toggle_text(&mut c.ram_types, ram_type));
    }

    pub fn toggle_ssd_type(&mut self, ssd_type: &str) {
        if ssd_type.trim().is_empty() {
            return;
        }
        self.edit_component(|c| toggle_text(&mut c.ssd_types, ssd_type));
    }

    pub fn toggle_psu_certification(&mut self, certification: &str) {
        if certification.trim().is_empty() {
            return;
        }
        self.edit_component(|c| toggle_text(&mut c.psu_certifications, certification));
    }

    /// Reset every field.
    pub fn clear(&mut self) {
        *self = FilterSelection::default();
    }

    /// Remove one chip's value. Dispatches on the chip key; unknown keys
    /// and values that do not parse for the key are ignored.
    ///
    /// Returns whether the selection changed.
    pub fn remove(&mut self, key: &str, value: &str) -> bool {
        let Ok(key) = key.parse::<FilterKey>() else {
            return false;
        };
        let before = self.clone();
        let value = value.trim();

        match key {
            FilterKey::Brand => {
                self.brands.remove(value);
            }
            FilterKey::Condition => {
                if let Ok(condition) = value.parse::<Condition>() {
                    self.conditions.remove(&condition);
                }
            }
            FilterKey::PriceMin => self.price_min = None,
            FilterKey::PriceMax => self.price_max = None,
            FilterKey::InStock => self.in_stock = None,
            FilterKey::HasWarranty => self.has_warranty = None,
            FilterKey::MinRating => self.min_rating = None,
            FilterKey::SortBy => self.sort_by = None,
            FilterKey::Search => self.search_query = None,
            FilterKey::ProcessorType => {
                if let (Some(l), Ok(p)) = (self.laptop_block(), value.parse::<ProcessorType>()) {
                    l.processor_types.remove(&p);
                }
            }
            FilterKey::LaptopRam => {
                if let (Some(l), Ok(gb)) = (self.laptop_block(), value.parse::<u32>()) {
                    l.ram_sizes.remove(&gb);
                }
            }
            FilterKey::StorageType => {
                if let (Some(l), Ok(s)) = (self.laptop_block(), value.parse::<StorageType>()) {
                    l.storage_types.remove(&s);
                }
            }
            FilterKey::ScreenSize => {
                if let (Some(l), Ok(s)) = (self.laptop_block(), value.parse::<ScreenSize>()) {
                    l.screen_sizes.remove(&s);
                }
            }
            FilterKey::GraphicsType => {
                if let Some(l) = self.laptop_block() {
                    l.graphics_types.remove(value);
                }
            }
            FilterKey::CpuType => {
                if let Some(d) = self.desktop_block() {
                    d.cpu_types.remove(value);
                }
            }
            FilterKey::DesktopRam => {
                if let (Some(d), Ok(gb)) = (self.desktop_block(), value.parse::<u32>()) {
                    d.ram_sizes.remove(&gb);
                }
            }
            FilterKey::HasGpu => {
                if let Some(d) = self.desktop_block() {
                    d.has_gpu = None;
                }
            }
            FilterKey::RamType => {
                if let Some(c) = self.component_block() {
                    c.ram_types.remove(value);
                }
            }
            FilterKey::SsdType => {
                if let Some(c) = self.component_block() {
                    c.ssd_types.remove(value);
                }
            }
            FilterKey::PsuCert => {
                if let Some(c) = self.component_block() {
                    c.psu_certifications.remove(value);
                }
            }
        }

        self.prune_extension();
        *self != before
    }

    fn laptop_block(&mut self) -> Option<&mut LaptopFilters> {
        match &mut self.extension {
            Some(CategoryExtension::Laptop(l)) => Some(l),
            _ => None,
        }
    }

    fn desktop_block(&mut self) -> Option<&mut DesktopFilters> {
        match &mut self.extension {
            Some(CategoryExtension::Desktop(d)) => Some(d),
            _ => None,
        }
    }

    fn component_block(&mut self) -> Option<&mut ComponentFilters> {
        match &mut self.extension {
            Some(CategoryExtension::Component(c)) => Some(c),
            _ => None,
        }
    }
}
