//! Currency conversion abstractions

use crate::core::rates::RateTable;
use std::sync::Arc;

pub trait CurrencyRateProvider: Send + Sync {
    /// Factor that turns an amount in `from` into an amount in `to`.
    fn get_rate(&self, from: &str, to: &str) -> f64;

    fn convert(&self, amount: f64, from: &str, to: &str) -> f64 {
        amount * self.get_rate(from, to)
    }
}

/// The currently selected currency pair together with the rate snapshot
/// used to resolve it.
#[derive(Debug, Clone)]
pub struct ConversionContext {
    from_currency: String,
    to_currency: String,
    rates: Arc<RateTable>,
}

impl ConversionContext {
    pub fn new(from_currency: &str, to_currency: &str, rates: Arc<RateTable>) -> Self {
        Self {
            from_currency: from_currency.to_string(),
            to_currency: to_currency.to_string(),
            rates,
        }
    }

    pub fn from_currency(&self) -> &str {
        &self.from_currency
    }

    pub fn to_currency(&self) -> &str {
        &self.to_currency
    }

    pub fn rate_table(&self) -> &RateTable {
        &self.rates
    }

    /// Fail-open rate for any pair in the snapshot.
    pub fn resolve_rate(&self, from: &str, to: &str) -> f64 {
        self.rates.resolve_rate(from, to)
    }

    /// Rate for the selected pair.
    pub fn rate(&self) -> f64 {
        self.get_rate(&self.from_currency, &self.to_currency)
    }

    /// Converts `amount` priced in `from` into the selected target currency.
    pub fn to_target(&self, amount: f64, from: &str) -> f64 {
        self.convert(amount, from, &self.to_currency)
    }
}

impl CurrencyRateProvider for ConversionContext {
    fn get_rate(&self, from: &str, to: &str) -> f64 {
        self.resolve_rate(from, to)
    }
}

impl PartialEq for ConversionContext {
    fn eq(&self, other: &Self) -> bool {
        self.from_currency == other.from_currency
            && self.to_currency == other.to_currency
            && (Arc::ptr_eq(&self.rates, &other.rates) || self.rates == other.rates)
    }
}
