use super::ui;
use crate::core::catalog::Catalog;
use crate::core::country::{CountryDirectory, Language, TaxInfo};
use crate::core::currency::ConversionContext;
use crate::core::filter::{FilterState, field_values};
use crate::core::pipeline::{ViewPipeline, ViewUpdate};
use crate::core::product::{FieldValue, Product};
use crate::core::sort::{SortDirection, SortKey};
use anyhow::Result;
use comfy_table::Cell;
use std::sync::{Arc, Mutex};

/// Selection given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub line: Option<String>,
    pub countries: Vec<String>,
    pub filters: Vec<(String, FieldValue)>,
    pub sort: Option<SortKey>,
    pub descending: bool,
    pub to_currency: Option<String>,
}

impl ListOptions {
    /// Filter state for `products`. A field value typed on the command line
    /// is matched to the stored value with the same text, so `storage=128`
    /// selects a storage the data holds as the string `"128"`.
    pub fn filter_state(&self, products: &[Product]) -> FilterState {
        let mut state = FilterState::default()
            .with_product_line(self.line.as_deref().unwrap_or_default())
            .with_countries(self.countries.iter().map(|c| c.to_uppercase()));
        for (field, value) in &self.filters {
            let wanted = value.to_string();
            let value = field_values(products, field, SortDirection::Ascending)
                .into_iter()
                .find(|known| known.to_string() == wanted)
                .unwrap_or_else(|| value.clone());
            state
                .field_filters
                .entry(field.clone())
                .or_default()
                .insert(value);
        }
        let direction = if self.descending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        state.with_sort(self.sort.clone().unwrap_or_default(), direction)
    }
}

/// Price after the tourist refund, for countries that offer one. Records
/// without tax details fall back to the country's advertised refund rate.
pub fn refund_price(product: &Product, tax_info: Option<&TaxInfo>) -> Option<f64> {
    let tax_info = tax_info.filter(|t| t.can_refund)?;
    let itemized = product.tax_fees.is_some() || product.field("tax_refund_price").is_some();
    if itemized {
        return product.tax_refund_price();
    }
    let retail = product.retail_price?;
    tax_info.estimated_refund(retail).map(|refund| retail - refund)
}

pub fn footer(update: &ViewUpdate) -> String {
    format!(
        "Found {} products from {} countries.",
        update.count, update.country_count
    )
}

/// Renders the view as a table, prices converted when a context is given.
pub fn display_view(
    products: &[Product],
    conversion: Option<&ConversionContext>,
    directory: &CountryDirectory,
    language: Language,
) -> String {
    let target = conversion.map(|ctx| ctx.to_currency().to_string());
    let target_label = target.as_deref().unwrap_or("N/A");

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Country"),
        ui::header_cell("Model"),
        ui::header_cell("Storage"),
        ui::header_cell("Price"),
        ui::header_cell(&format!("Price ({target_label})")),
        ui::header_cell("Tax Refund"),
        ui::header_cell(&format!("After Refund ({target_label})")),
    ]);

    let convert =
        |amount: f64, currency: &str| conversion.map(|ctx| ctx.to_target(amount, currency));

    for product in products {
        let tax_info = directory.tax_info(&product.country_code);
        let refund_rate = tax_info
            .filter(|t| t.can_refund)
            .map(|t| t.refund_rate.as_str());
        let converted = product
            .retail_price
            .and_then(|p| convert(p, &product.currency));
        let after_refund =
            refund_price(product, tax_info).and_then(|p| convert(p, &product.currency));
        let currency = &product.currency;

        table.add_row(vec![
            Cell::new(directory.display_name(&product.country_code, language)),
            Cell::new(&product.model),
            Cell::new(product.storage.as_deref().unwrap_or("-")),
            ui::format_optional_cell(product.retail_price, |p| {
                format!("{} {currency}", ui::format_amount(p))
            }),
            ui::format_optional_cell(converted, ui::format_amount),
            ui::refund_badge_cell(refund_rate),
            ui::format_optional_cell(after_refund, ui::format_amount),
        ]);
    }

    table.to_string()
}

/// Builds the pipeline from the catalog and renders the selected view.
pub fn display_list(
    catalog: &Catalog,
    options: &ListOptions,
    from_currency: &str,
    to_currency: &str,
    language: Language,
) -> Result<String> {
    let to_currency = options.to_currency.as_deref().unwrap_or(to_currency);
    let mut pipeline = ViewPipeline::from_catalog(catalog, from_currency, to_currency)?;

    let summary = Arc::new(Mutex::new(String::new()));
    let sink = Arc::clone(&summary);
    pipeline.subscribe(move |update: &ViewUpdate| {
        if let Ok(mut line) = sink.lock() {
            *line = footer(update);
        }
    });
    let state = options.filter_state(pipeline.products());
    pipeline.set_state(state);

    let update = pipeline.view();
    let directory = catalog.country_directory();

    let title = options
        .line
        .as_deref()
        .filter(|l| !l.is_empty())
        .unwrap_or("All products");
    let mut output = format!("{}\n\n", ui::style_text(title, ui::StyleType::Title));
    if update.count == 0 {
        output.push_str(&ui::style_text(
            "No products match the current filters.",
            ui::StyleType::Subtle,
        ));
        output.push('\n');
    } else {
        output.push_str(&display_view(
            &update.products,
            pipeline.conversion(),
            &directory,
            language,
        ));
        output.push('\n');
    }

    let summary = summary.lock().map(|s| s.clone()).unwrap_or_default();
    output.push_str(&format!(
        "\n{}",
        ui::style_text(&summary, ui::StyleType::TotalLabel)
    ));
    Ok(output)
}
