//! Core business logic: rates, products, filtering, sorting and the view
//! pipeline.

pub mod catalog;
pub mod config;
pub mod country;
pub mod currency;
pub mod filter;
pub mod index;
pub mod log;
pub mod pipeline;
pub mod product;
pub mod rates;
pub mod sort;
pub mod source;

// Re-export main types for cleaner imports
pub use currency::{ConversionContext, CurrencyRateProvider};
pub use filter::FilterState;
pub use pipeline::{ViewPipeline, ViewUpdate, compute_view};
pub use product::{FieldValue, Product};
pub use rates::{RateRecord, RateTable};
pub use source::DataSource;
