pub mod facets;
pub mod index;
pub mod list;
pub mod rates;
pub mod setup;
pub mod ui;
