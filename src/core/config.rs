use crate::core::country::Language;
use crate::core::rates::DEFAULT_REFERENCE_CURRENCY;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://globalprice.example.com";

/// Where the data files are read from. A local `data_path` wins over
/// `base_url`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SourceConfig {
    pub base_url: Option<String>,
    pub data_path: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            data_path: None,
        }
    }
}

fn default_from_currency() -> String {
    "USD".to_string()
}

fn default_to_currency() -> String {
    "CNY".to_string()
}

fn default_reference_currency() -> String {
    DEFAULT_REFERENCE_CURRENCY.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CurrencyConfig {
    #[serde(default = "default_from_currency")]
    pub from: String,
    #[serde(default = "default_to_currency")]
    pub to: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        CurrencyConfig {
            from: default_from_currency(),
            to: default_to_currency(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default = "default_reference_currency")]
    pub reference_currency: String,
    #[serde(default)]
    pub currency: CurrencyConfig,
    #[serde(default)]
    pub language: Language,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            source: SourceConfig::default(),
            reference_currency: default_reference_currency(),
            currency: CurrencyConfig::default(),
            language: Language::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "globalprice", "globalprice")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!(source = ?config.source, language = %config.language, "Successfully loaded config");
        Ok(config)
    }
}
