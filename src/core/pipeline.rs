//! The view pipeline: product line, countries, field filters, then sort.

use crate::core::catalog::Catalog;
use crate::core::currency::ConversionContext;
use crate::core::filter::{FilterState, apply_countries, apply_filters, apply_product_line};
use crate::core::product::Product;
use crate::core::sort::apply_sort;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Product data unavailable: {0}")]
    ProductsUnavailable(String),
}

/// Computes the view for `state` from scratch.
pub fn compute_view(
    products: &[Product],
    state: &FilterState,
    conversion: Option<&ConversionContext>,
) -> Vec<Product> {
    let items = apply_product_line(products, &state.product_line);
    let items = apply_countries(items, &state.countries);
    let items = apply_filters(items, &state.field_filters);
    apply_sort(items, &state.sort, conversion)
        .into_iter()
        .cloned()
        .collect()
}

/// What observers receive whenever the view changes.
#[derive(Debug, Clone)]
pub struct ViewUpdate {
    pub products: Arc<[Product]>,
    pub count: usize,
    pub country_count: usize,
}

impl ViewUpdate {
    fn new(products: Vec<Product>) -> Self {
        let country_count = products
            .iter()
            .map(|p| p.country_code.as_str())
            .collect::<BTreeSet<_>>()
            .len();
        Self {
            count: products.len(),
            country_count,
            products: Arc::from(products),
        }
    }
}

pub type Observer = Box<dyn FnMut(&ViewUpdate) + Send>;

struct Memo {
    products: Arc<[Product]>,
    state: FilterState,
    conversion: Option<ConversionContext>,
    update: ViewUpdate,
}

impl Memo {
    fn matches(
        &self,
        products: &Arc<[Product]>,
        state: &FilterState,
        conversion: &Option<ConversionContext>,
    ) -> bool {
        Arc::ptr_eq(&self.products, products)
            && self.state == *state
            && self.conversion == *conversion
    }
}

/// Holds the inputs of the view and recomputes it only when one of them
/// changes.
pub struct ViewPipeline {
    products: Arc<[Product]>,
    state: FilterState,
    conversion: Option<ConversionContext>,
    memo: Option<Memo>,
    published: Option<Arc<[Product]>>,
    observers: Vec<Observer>,
}

impl ViewPipeline {
    pub fn new(products: Arc<[Product]>, conversion: Option<ConversionContext>) -> Self {
        Self {
            products,
            state: FilterState::default(),
            conversion,
            memo: None,
            published: None,
            observers: Vec::new(),
        }
    }

    /// Builds a pipeline over the catalog products, converting into `to`.
    pub fn from_catalog(catalog: &Catalog, from: &str, to: &str) -> Result<Self, ViewError> {
        let products = match &catalog.products {
            Ok(products) => Arc::clone(products),
            Err(e) => return Err(ViewError::ProductsUnavailable(format!("{e:#}"))),
        };
        Ok(Self::new(products, catalog.conversion(from, to)))
    }

    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&ViewUpdate) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn conversion(&self) -> Option<&ConversionContext> {
        self.conversion.as_ref()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn set_state(&mut self, state: FilterState) {
        self.state = state;
        self.refresh();
    }

    pub fn update_state<F: FnOnce(&mut FilterState)>(&mut self, change: F) {
        change(&mut self.state);
        self.refresh();
    }

    pub fn set_conversion(&mut self, conversion: Option<ConversionContext>) {
        self.conversion = conversion;
        self.refresh();
    }

    pub fn set_products(&mut self, products: Arc<[Product]>) {
        self.products = products;
        self.refresh();
    }

    /// Current view. Unchanged inputs return the same shared slice.
    pub fn view(&mut self) -> ViewUpdate {
        let cached = self
            .memo
            .as_ref()
            .filter(|memo| memo.matches(&self.products, &self.state, &self.conversion));
        if let Some(memo) = cached {
            return memo.update.clone();
        }

        let update = ViewUpdate::new(compute_view(
            &self.products,
            &self.state,
            self.conversion.as_ref(),
        ));
        debug!(
            count = update.count,
            countries = update.country_count,
            "Recomputed view"
        );
        self.memo = Some(Memo {
            products: Arc::clone(&self.products),
            state: self.state.clone(),
            conversion: self.conversion.clone(),
            update: update.clone(),
        });
        update
    }

    /// Recomputes the view and notifies observers if it changed since the
    /// last notification.
    pub fn refresh(&mut self) {
        let update = self.view();
        let changed = match &self.published {
            Some(previous) => {
                !Arc::ptr_eq(previous, &update.products) && **previous != *update.products
            }
            None => true,
        };
        if changed {
            self.published = Some(Arc::clone(&update.products));
            for observer in &mut self.observers {
                observer(&update);
            }
        }
    }
}
