//! Exchange rate snapshots and cross-rate resolution.
//!
//! A snapshot is a list of [`RateRecord`]s, each quoting other currencies
//! against its own base currency. Snapshots are sparse: they are only
//! guaranteed to be complete against one reference currency, so arbitrary
//! pairs are resolved by composing `from -> reference -> to`.

use crate::core::currency::CurrencyRateProvider;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_REFERENCE_CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    pub base_currency: String,
    pub rates: HashMap<String, f64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RateSnapshot {
    Many(Vec<RateRecord>),
    One(RateRecord),
}

/// Parses a rate snapshot document, which is either an array of records or a
/// single record.
pub fn parse_snapshot(json: &str) -> serde_json::Result<Vec<RateRecord>> {
    Ok(match serde_json::from_str::<RateSnapshot>(json)? {
        RateSnapshot::Many(records) => records,
        RateSnapshot::One(record) => vec![record],
    })
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RateError {
    #[error("No direct or inverse rate found between {currency} and {reference}")]
    Unresolvable { currency: String, reference: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateQuote {
    pub rate: f64,
    /// Both sides differ from the reference currency, so the rate was
    /// composed through it.
    pub via_reference: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    reference: String,
    records: Vec<RateRecord>,
    by_base: HashMap<String, usize>,
}

impl RateTable {
    pub fn new(records: Vec<RateRecord>) -> Self {
        Self::with_reference(records, DEFAULT_REFERENCE_CURRENCY)
    }

    pub fn with_reference(records: Vec<RateRecord>, reference: &str) -> Self {
        let records: Vec<RateRecord> = records
            .into_iter()
            .map(|mut record| {
                if record.rates.remove(&record.base_currency).is_some() {
                    debug!("Dropped self rate from {} record", record.base_currency);
                }
                record
            })
            .collect();

        let mut by_base = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            // first record wins for a duplicated base
            by_base.entry(record.base_currency.clone()).or_insert(i);
        }

        Self {
            reference: reference.to_string(),
            records,
            by_base,
        }
    }

    pub fn reference_currency(&self) -> &str {
        &self.reference
    }

    pub fn records(&self) -> &[RateRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, base_currency: &str) -> Option<&RateRecord> {
        self.by_base.get(base_currency).map(|&i| &self.records[i])
    }

    /// Date of the snapshot, taken from the first dated record.
    pub fn date(&self) -> Option<NaiveDate> {
        self.records.iter().find_map(|r| r.date)
    }

    /// Every currency that appears either as a base or as a quoted currency.
    pub fn available_currencies(&self) -> BTreeSet<String> {
        let mut currencies = BTreeSet::new();
        for record in &self.records {
            currencies.insert(record.base_currency.clone());
            currencies.extend(record.rates.keys().cloned());
        }
        currencies
    }

    /// `1 reference = x a` and `1 reference = y b`, as tabulated in the
    /// reference record.
    pub fn reference_legs(&self, a: &str, b: &str) -> (Option<f64>, Option<f64>) {
        let leg = |currency: &str| {
            if currency == self.reference {
                Some(1.0)
            } else {
                self.tabulated(&self.reference, currency)
            }
        };
        (leg(a), leg(b))
    }

    fn tabulated(&self, base: &str, quote: &str) -> Option<f64> {
        self.record(base)
            .and_then(|r| r.rates.get(quote))
            .copied()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
    }

    fn unresolvable(&self, currency: &str) -> RateError {
        RateError::Unresolvable {
            currency: currency.to_string(),
            reference: self.reference.clone(),
        }
    }

    // from -> reference: direct quote in the `from` record, else the inverse
    // of the reference record's quote.
    fn to_reference(&self, currency: &str) -> Result<f64, RateError> {
        if currency == self.reference {
            return Ok(1.0);
        }
        if let Some(rate) = self.tabulated(currency, &self.reference) {
            return Ok(rate);
        }
        self.tabulated(&self.reference, currency)
            .map(|rate| 1.0 / rate)
            .ok_or_else(|| self.unresolvable(currency))
    }

    // reference -> to: direct quote in the reference record, else the inverse
    // of the `to` record's quote.
    fn from_reference(&self, currency: &str) -> Result<f64, RateError> {
        if currency == self.reference {
            return Ok(1.0);
        }
        if let Some(rate) = self.tabulated(&self.reference, currency) {
            return Ok(rate);
        }
        self.tabulated(currency, &self.reference)
            .map(|rate| 1.0 / rate)
            .ok_or_else(|| self.unresolvable(currency))
    }

    /// Resolves `from -> to`, reporting pairs the snapshot cannot connect.
    pub fn try_resolve(&self, from: &str, to: &str) -> Result<RateQuote, RateError> {
        if from == to {
            return Ok(RateQuote {
                rate: 1.0,
                via_reference: false,
            });
        }
        let from_to_reference = self.to_reference(from)?;
        let reference_to_to = self.from_reference(to)?;
        Ok(RateQuote {
            rate: from_to_reference * reference_to_to,
            via_reference: from != self.reference && to != self.reference,
        })
    }

    /// Resolves `from -> to`, falling back to `1.0` when the pair cannot be
    /// connected through the reference currency.
    pub fn resolve_rate(&self, from: &str, to: &str) -> f64 {
        match self.try_resolve(from, to) {
            Ok(quote) => quote.rate,
            Err(e) => {
                warn!(from = %from, to = %to, "{e}. Assuming 1.");
                1.0
            }
        }
    }
}

impl CurrencyRateProvider for RateTable {
    fn get_rate(&self, from: &str, to: &str) -> f64 {
        self.resolve_rate(from, to)
    }
}
