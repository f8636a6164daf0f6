//! Loading of the product catalog, country table and rate snapshot.

use crate::core::country::{Country, CountryDirectory};
use crate::core::currency::ConversionContext;
use crate::core::index::{CategoryIndex, INDEX_FILE, PriceIndex};
use crate::core::product::Product;
use crate::core::rates::{RateTable, parse_snapshot};
use crate::core::source::DataSource;
use anyhow::{Context, Result, anyhow};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const PRICES_DIR: &str = "data/prices";
pub const COUNTRIES_PATH: &str = "data/country_info/cr.json";
pub const RATES_PATH: &str = "data/exchange_rates/latest.json";

/// Product lines shown when the main index cannot be read.
pub const FALLBACK_PRODUCT_LINES: [&str; 3] = ["iPhone", "iPad", "Mac"];

/// Everything loaded for a session. Each dataset loads independently, so one
/// failing leaves the others usable.
#[derive(Debug)]
pub struct Catalog {
    pub categories: Result<Vec<String>>,
    pub products: Result<Arc<[Product]>>,
    pub countries: Result<Vec<Country>>,
    pub rates: Result<Arc<RateTable>>,
}

impl Catalog {
    /// Product lines to offer, falling back to the built-in ones when the
    /// catalog index is unavailable.
    pub fn product_lines(&self) -> Vec<String> {
        product_lines_or_fallback(self.categories.as_ref().ok().cloned())
    }

    pub fn country_directory(&self) -> CountryDirectory {
        match &self.countries {
            Ok(countries) => CountryDirectory::new(countries.clone()),
            Err(e) => {
                warn!("Country data unavailable, showing raw codes: {e:#}");
                CountryDirectory::default()
            }
        }
    }

    /// Conversion context for the pair, or `None` when no rates loaded.
    pub fn conversion(&self, from: &str, to: &str) -> Option<ConversionContext> {
        match &self.rates {
            Ok(rates) => Some(ConversionContext::new(from, to, Arc::clone(rates))),
            Err(e) => {
                warn!("Exchange rates unavailable, prices will not be converted: {e:#}");
                None
            }
        }
    }
}

pub fn product_lines_or_fallback(categories: Option<Vec<String>>) -> Vec<String> {
    match categories {
        Some(categories) if !categories.is_empty() => categories,
        _ => FALLBACK_PRODUCT_LINES.iter().map(|s| s.to_string()).collect(),
    }
}

async fn fetch_json<T: serde::de::DeserializeOwned>(
    source: &dyn DataSource,
    path: &str,
) -> Result<T> {
    let body = source.fetch(path).await?;
    serde_json::from_str(&body).with_context(|| format!("Failed to parse JSON document: {path}"))
}

pub async fn load_price_index(source: &dyn DataSource) -> Result<PriceIndex> {
    let index: PriceIndex = fetch_json(source, &format!("{PRICES_DIR}/{INDEX_FILE}"))
        .await
        .context("Main price index unavailable")?;
    debug!(
        categories = ?index.categories,
        last_updated = ?index.last_updated,
        "Loaded main index"
    );
    Ok(index)
}

async fn load_category(source: &dyn DataSource, category: &str) -> Result<Vec<Product>> {
    let index: CategoryIndex =
        fetch_json(source, &format!("{PRICES_DIR}/{category}/{INDEX_FILE}")).await?;
    if !index.invalid_files.is_empty() {
        warn!(
            "Category {category} lists invalid files: {:?}",
            index.invalid_files
        );
    }

    let mut products = Vec::new();
    for file in &index.files {
        let path = format!("{PRICES_DIR}/{category}/{file}");
        match fetch_json::<Vec<Product>>(source, &path).await {
            Ok(batch) => {
                debug!("{path}: {} products", batch.len());
                products.extend(batch.into_iter().map(|mut p| {
                    p.category = category.to_string();
                    p
                }));
            }
            Err(e) => warn!("Skipping {path}: {e:#}"),
        }
    }
    Ok(products)
}

/// Loads every category listed in the main index. Categories and files that
/// fail are skipped; only a missing main index fails the catalog.
pub async fn load_products(source: &dyn DataSource) -> Result<(Vec<String>, Vec<Product>)> {
    let index = load_price_index(source).await?;

    let batches = join_all(
        index
            .categories
            .iter()
            .map(|category| load_category(source, category)),
    )
    .await;

    let mut products = Vec::new();
    for (category, batch) in index.categories.iter().zip(batches) {
        match batch {
            Ok(batch) => products.extend(batch),
            Err(e) => warn!("Skipping category {category}: {e:#}"),
        }
    }
    Ok((index.categories, products))
}

pub async fn load_countries(source: &dyn DataSource) -> Result<Vec<Country>> {
    fetch_json(source, COUNTRIES_PATH)
        .await
        .context("Country data unavailable")
}

pub async fn load_rates(source: &dyn DataSource, reference_currency: &str) -> Result<RateTable> {
    let body = source
        .fetch(RATES_PATH)
        .await
        .context("Exchange rates unavailable")?;
    let records = parse_snapshot(&body)
        .with_context(|| format!("Failed to parse JSON document: {RATES_PATH}"))?;
    let table = RateTable::with_reference(records, reference_currency);
    if table.record(reference_currency).is_none() {
        warn!("Rate snapshot has no {reference_currency} record, cross rates will be incomplete");
    }
    Ok(table)
}

/// Loads all datasets concurrently.
pub async fn load_catalog(source: &dyn DataSource, reference_currency: &str) -> Catalog {
    let (products, countries, rates) = futures::join!(
        load_products(source),
        load_countries(source),
        load_rates(source, reference_currency)
    );

    let (categories, products) = match products {
        Ok((categories, products)) => (Ok(categories), Ok(Arc::from(products))),
        Err(e) => (Err(anyhow!("{e:#}")), Err(e)),
    };

    let catalog = Catalog {
        categories,
        products,
        countries,
        rates: rates.map(Arc::new),
    };
    info!(
        products = catalog.products.as_ref().map_or(0, |p| p.len()),
        countries = catalog.countries.as_ref().map_or(0, |c| c.len()),
        rates_loaded = catalog.rates.is_ok(),
        "Catalog loaded"
    );
    catalog
}
