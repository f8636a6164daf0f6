//! Selection state and the filters applied to product views.

use crate::core::product::{FieldValue, Product};
use crate::core::sort::{SortDirection, SortKey, SortSpec, compare_values};
use std::collections::{BTreeMap, BTreeSet};

/// Fields never offered as filter facets.
pub const EXCLUDED_FACETS: [&str; 7] = [
    "country_code",
    "launch_date",
    "notes",
    "category",
    "retail_price",
    "currency",
    "contributor",
];

/// Everything the user has selected. An empty selection in any dimension
/// accepts every product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub product_line: String,
    pub countries: BTreeSet<String>,
    pub field_filters: BTreeMap<String, BTreeSet<FieldValue>>,
    pub sort: SortSpec,
}

impl FilterState {
    pub fn with_product_line(mut self, line: &str) -> Self {
        self.product_line = line.to_string();
        self
    }

    pub fn with_countries<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_field_filter<I>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = FieldValue>,
    {
        self.field_filters
            .insert(field.to_string(), values.into_iter().collect());
        self
    }

    pub fn with_sort(mut self, key: SortKey, direction: SortDirection) -> Self {
        self.sort = SortSpec::new(key, direction);
        self
    }

    pub fn toggle_country(&mut self, code: &str) {
        if !self.countries.remove(code) {
            self.countries.insert(code.to_string());
        }
    }

    pub fn toggle_field_value(&mut self, field: &str, value: FieldValue) {
        let values = self.field_filters.entry(field.to_string()).or_default();
        if !values.remove(&value) {
            values.insert(value);
        }
    }

    pub fn clear_field(&mut self, field: &str) {
        self.field_filters.insert(field.to_string(), BTreeSet::new());
    }

    /// Drops the field filters and restores the default sort.
    pub fn reset_secondary(&mut self) {
        self.field_filters.clear();
        self.sort = SortSpec::default();
    }

    /// Drops the product line and country selections.
    pub fn clear_primary(&mut self) {
        self.product_line.clear();
        self.countries.clear();
    }
}

pub fn matches_product_line(product: &Product, line: &str) -> bool {
    line.is_empty() || product.model.to_lowercase().contains(&line.to_lowercase())
}

pub fn apply_product_line<'a>(
    items: impl IntoIterator<Item = &'a Product>,
    line: &str,
) -> Vec<&'a Product> {
    items
        .into_iter()
        .filter(|p| matches_product_line(p, line))
        .collect()
}

pub fn apply_countries<'a>(
    items: impl IntoIterator<Item = &'a Product>,
    countries: &BTreeSet<String>,
) -> Vec<&'a Product> {
    items
        .into_iter()
        .filter(|p| countries.is_empty() || countries.contains(&p.country_code))
        .collect()
}

/// Keeps the items that match every non-empty allow-list. A product lacking
/// the field never matches a non-empty list.
pub fn apply_filters<'a>(
    items: impl IntoIterator<Item = &'a Product>,
    filters: &BTreeMap<String, BTreeSet<FieldValue>>,
) -> Vec<&'a Product> {
    let active: Vec<_> = filters
        .iter()
        .filter(|(_, allowed)| !allowed.is_empty())
        .collect();

    items
        .into_iter()
        .filter(|product| {
            active.iter().all(|(field, allowed)| {
                product
                    .field(field)
                    .is_some_and(|value| allowed.contains(&value))
            })
        })
        .collect()
}

/// Fields of the first product that can be used as filter facets.
pub fn filterable_fields(products: &[Product]) -> Vec<String> {
    products.first().map_or_else(Vec::new, |first| {
        first
            .field_names()
            .into_iter()
            .filter(|name| !EXCLUDED_FACETS.contains(&name.as_str()))
            .collect()
    })
}

/// Distinct present values of `field`, ordered like the sort engine would
/// order them.
pub fn field_values(
    products: &[Product],
    field: &str,
    direction: SortDirection,
) -> Vec<FieldValue> {
    let distinct: BTreeSet<FieldValue> =
        products.iter().filter_map(|p| p.field(field)).collect();
    let mut values: Vec<FieldValue> = distinct.into_iter().collect();
    values.sort_by(|a, b| match direction {
        SortDirection::Ascending => compare_values(a, b),
        SortDirection::Descending => compare_values(b, a),
    });
    values
}
