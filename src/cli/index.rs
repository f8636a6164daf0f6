use super::ui;
use crate::core::index::{IndexSummary, generate_index_files};
use anyhow::Result;
use std::path::Path;

pub fn display_summary(prices_dir: &Path, summary: &IndexSummary) -> String {
    let mut output = format!(
        "Indexed {} categories in {}: {}",
        summary.categories.len(),
        prices_dir.display(),
        summary.categories.join(", ")
    );
    output.push_str(&format!("\n{} valid files", summary.valid_files));
    if summary.invalid_files > 0 {
        output.push_str(&format!(
            ", {}",
            ui::style_text(
                &format!("{} invalid files skipped", summary.invalid_files),
                ui::StyleType::Warning
            )
        ));
    }
    output
}

/// Regenerates the index files under `prices_dir`.
pub fn run_index(prices_dir: &Path) -> Result<()> {
    let summary = generate_index_files(prices_dir)?;
    println!("{}", display_summary(prices_dir, &summary));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_run_index() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::create_dir_all(temp_dir.path().join("iPad"))?;
        fs::write(
            temp_dir.path().join("iPad/us.json"),
            r#"[{"model": "iPad Air", "country_code": "US", "currency": "USD", "retail_price": 599}]"#,
        )?;
        run_index(temp_dir.path())?;
        assert!(temp_dir.path().join("index.json").exists());
        assert!(temp_dir.path().join("iPad/index.json").exists());
        Ok(())
    }

    #[test]
    fn test_display_summary() {
        let summary = IndexSummary {
            categories: vec!["Mac".to_string(), "iPhone".to_string()],
            valid_files: 5,
            invalid_files: 1,
        };
        let output = console::strip_ansi_codes(&display_summary(Path::new("data/prices"), &summary))
            .to_string();
        assert!(output.starts_with("Indexed 2 categories in data/prices: Mac, iPhone"));
        assert!(output.contains("5 valid files, 1 invalid files skipped"));
    }
}
