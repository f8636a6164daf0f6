//! Ordering of product views.

use crate::core::currency::ConversionContext;
use crate::core::product::{FieldValue, Product};
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    /// Retail price, converted into the target currency when one is selected.
    #[default]
    Price,
    /// Price after tax refund, converted like `Price`.
    RefundPrice,
    /// Any raw product field.
    Field(String),
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(anyhow::anyhow!("Sort key cannot be empty")),
            "price" | "total_price" => Ok(SortKey::Price),
            "refund" | "tax_refund_price" => Ok(SortKey::RefundPrice),
            field => Ok(SortKey::Field(field.to_string())),
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Price => write!(f, "price"),
            SortKey::RefundPrice => write!(f, "refund"),
            SortKey::Field(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Selecting the active key flips its direction; a new key starts
    /// ascending.
    pub fn select(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.toggled();
        } else {
            self.key = key;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Two numbers compare numerically; anything else compares by lowercase
/// string form.
pub fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Number(x), FieldValue::Number(y)) => x.total_cmp(y),
        _ => a.to_string().to_lowercase().cmp(&b.to_string().to_lowercase()),
    }
}

fn sort_value(
    product: &Product,
    key: &SortKey,
    conversion: Option<&ConversionContext>,
) -> Option<FieldValue> {
    let price = match key {
        SortKey::Field(name) => return product.field(name),
        SortKey::Price => product.retail_price,
        SortKey::RefundPrice => product.tax_refund_price(),
    }?;
    let price = match conversion {
        Some(ctx) => ctx.to_target(price, &product.currency),
        None => price,
    };
    Some(FieldValue::Number(price))
}

/// Stable sort of `items` by `spec`. Items without a value for the key go
/// last in either direction, in their input order.
pub fn apply_sort<'a>(
    items: impl IntoIterator<Item = &'a Product>,
    spec: &SortSpec,
    conversion: Option<&ConversionContext>,
) -> Vec<&'a Product> {
    let mut keyed: Vec<(Option<FieldValue>, &'a Product)> = items
        .into_iter()
        .map(|p| (sort_value(p, &spec.key, conversion), p))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => spec.direction.apply(compare_values(a, b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    keyed.into_iter().map(|(_, p)| p).collect()
}
