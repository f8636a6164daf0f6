//! Index files describing the price catalog layout, and their generation.
//!
//! `data/prices/index.json` lists the categories; every category directory
//! carries its own `index.json` listing the product files it holds.

use crate::core::product::Product;
use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

pub const INDEX_FILE: &str = "index.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceIndex {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub category_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryIndex {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub file_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_file_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_file_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_files: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexSummary {
    pub categories: Vec<String>,
    pub valid_files: usize,
    pub invalid_files: usize,
}

fn is_product_file(name: &str) -> bool {
    name.ends_with(".json") && name != INDEX_FILE
}

fn validate_product_file(path: &Path) -> Result<usize> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read product file: {}", path.display()))?;
    let products: Vec<Product> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse product file: {}", path.display()))?;
    Ok(products.len())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write index file: {}", path.display()))
}

/// Writes a category index into every category directory under `prices_dir`
/// that holds at least one valid product file, then the main index.
pub fn generate_index_files(prices_dir: &Path) -> Result<IndexSummary> {
    if !prices_dir.is_dir() {
        anyhow::bail!("Prices directory does not exist: {}", prices_dir.display());
    }

    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let mut summary = IndexSummary::default();

    let mut category_dirs: Vec<_> = fs::read_dir(prices_dir)
        .with_context(|| format!("Failed to list directory: {}", prices_dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .collect();
    category_dirs.sort_by_key(|entry| entry.file_name());

    for entry in category_dirs {
        let category = entry.file_name().to_string_lossy().to_string();
        let category_path = entry.path();

        let mut names: Vec<String> = fs::read_dir(&category_path)
            .with_context(|| format!("Failed to list directory: {}", category_path.display()))?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| is_product_file(name))
            .collect();
        names.sort();

        let mut files = Vec::new();
        let mut invalid_files = Vec::new();
        for name in names {
            match validate_product_file(&category_path.join(&name)) {
                Ok(count) => {
                    debug!("{category}/{name}: {count} products");
                    files.push(name);
                }
                Err(e) => {
                    warn!("Skipping invalid product file {category}/{name}: {e:#}");
                    invalid_files.push(name);
                }
            }
        }

        summary.invalid_files += invalid_files.len();
        if files.is_empty() {
            debug!("No valid product files in {category}, leaving it out");
            continue;
        }
        summary.valid_files += files.len();

        let index = CategoryIndex {
            category: category.clone(),
            file_count: files.len(),
            valid_file_count: Some(files.len()),
            invalid_file_count: Some(invalid_files.len()),
            files,
            invalid_files,
            last_updated: Some(timestamp.clone()),
        };
        write_json(&category_path.join(INDEX_FILE), &index)?;
        info!("Generated {category} index: {} files", index.file_count);
        summary.categories.push(category);
    }

    let main_index = PriceIndex {
        category_count: summary.categories.len(),
        categories: summary.categories.clone(),
        last_updated: Some(timestamp),
    };
    write_json(&prices_dir.join(INDEX_FILE), &main_index)?;
    info!("Generated main index: {} categories", main_index.category_count);

    Ok(summary)
}
