use super::ui;
use crate::core::filter::{FilterState, field_values, filterable_fields};
use crate::core::pipeline::compute_view;
use crate::core::product::Product;
use crate::core::sort::SortDirection;
use comfy_table::Cell;

/// Filterable fields of the products in `line` and their distinct values.
pub fn display_fields(products: &[Product], line: Option<&str>) -> String {
    let state = FilterState::default().with_product_line(line.unwrap_or_default());
    let selected = compute_view(products, &state, None);
    let fields = filterable_fields(&selected);
    if fields.is_empty() {
        return ui::style_text("No filterable fields found.", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Field"), ui::header_cell("Values")]);
    for field in fields {
        let values: Vec<String> = field_values(&selected, &field, SortDirection::Ascending)
            .iter()
            .map(|v| v.to_string())
            .collect();
        table.add_row(vec![Cell::new(&field), Cell::new(values.join(", "))]);
    }
    table.to_string()
}

/// Product lines with the number of listings in each.
pub fn display_lines(lines: &[String], products: Option<&[Product]>) -> String {
    let mut output = format!(
        "{}\n",
        ui::style_text("Product lines", ui::StyleType::Title)
    );
    for line in lines {
        let count = products.map(|products| {
            products
                .iter()
                .filter(|p| p.category.eq_ignore_ascii_case(line))
                .count()
        });
        match count {
            Some(count) => output.push_str(&format!(
                "\n  {line} {}",
                ui::style_text(&format!("({count} listings)"), ui::StyleType::Subtle)
            )),
            None => output.push_str(&format!("\n  {line}")),
        }
    }
    output
}
