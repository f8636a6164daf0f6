use super::ui;
use crate::core::rates::RateTable;
use comfy_table::Cell;

fn format_rate(rate: f64) -> String {
    format!("{rate:.6}")
}

/// Resolved rate for `from -> to` with the reference legs it went through
/// and `amount` converted.
pub fn display_rate(table: &RateTable, from: &str, to: &str, amount: f64) -> String {
    let from = from.to_uppercase();
    let to = to.to_uppercase();
    let reference = table.reference_currency();

    let mut output = format!(
        "{}\n\n",
        ui::style_text(&format!("{from} → {to}"), ui::StyleType::Title)
    );

    match table.try_resolve(&from, &to) {
        Ok(quote) => {
            output.push_str(&format!(
                "1 {from} = {} {to}\n",
                ui::style_text(&format_rate(quote.rate), ui::StyleType::TotalValue)
            ));
            if quote.via_reference {
                let (from_leg, to_leg) = table.reference_legs(&from, &to);
                let leg = |rate: Option<f64>, currency: &str| {
                    rate.map_or_else(
                        || format!("1 {reference} = ? {currency}"),
                        |r| format!("1 {reference} = {} {currency}", format_rate(r)),
                    )
                };
                output.push_str(&ui::style_text(
                    &format!(
                        "via {reference}: {}, {}",
                        leg(from_leg, &from),
                        leg(to_leg, &to)
                    ),
                    ui::StyleType::Subtle,
                ));
                output.push('\n');
            }
        }
        Err(e) => {
            output.push_str(&ui::style_text(
                &format!("{e}. Assuming 1."),
                ui::StyleType::Warning,
            ));
            output.push('\n');
        }
    }

    let converted = amount * table.resolve_rate(&from, &to);
    output.push_str(&format!(
        "\n{} {from} = {} {to}\n",
        ui::format_amount(amount),
        ui::style_text(&ui::format_amount(converted), ui::StyleType::TotalLabel)
    ));

    let as_of = table
        .date()
        .map_or_else(|| "Rate date unknown".to_string(), |d| format!("Rates as of {d}"));
    output.push_str(&ui::style_text(&as_of, ui::StyleType::Subtle));
    output
}

/// Currencies known to the snapshot and their quote against the reference.
pub fn display_currencies(table: &RateTable) -> String {
    let reference = table.reference_currency();
    let mut grid = ui::new_styled_table();
    grid.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Per 1 {reference}")),
    ]);

    let currencies = table.available_currencies();
    for currency in &currencies {
        let quote = table.reference_legs(reference, currency).1;
        grid.add_row(vec![
            Cell::new(currency),
            ui::format_optional_cell(quote, format_rate),
        ]);
    }

    format!(
        "{}\n\n{}\n\n{} currencies",
        ui::style_text("Available currencies", ui::StyleType::Title),
        grid,
        currencies.len()
    )
}
