pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::list::ListOptions;
use crate::cli::{facets, list, rates, ui};
use crate::core::catalog::{self, product_lines_or_fallback};
use crate::core::config::AppConfig;
use crate::core::source::DataSource;
use anyhow::Result;
use tracing::{debug, info};

/// Commands that read the price data.
#[derive(Debug, Clone)]
pub enum AppCommand {
    List(ListOptions),
    Rate {
        from: Option<String>,
        to: Option<String>,
        amount: f64,
    },
    Currencies,
    Fields {
        line: Option<String>,
    },
    Lines,
}

/// Loads the configuration at `config_path`, or the default one. A missing
/// default config file means built-in defaults.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    match config_path {
        Some(path) => AppConfig::load_from_path(path),
        None => {
            let path = AppConfig::default_config_path()?;
            if path.exists() {
                AppConfig::load()
            } else {
                debug!("No config at {}, using defaults", path.display());
                Ok(AppConfig::default())
            }
        }
    }
}

/// Runs `command` against `source` and returns the rendered output.
pub async fn execute(
    command: AppCommand,
    config: &AppConfig,
    source: &dyn DataSource,
) -> Result<String> {
    let reference = config.reference_currency.as_str();
    match command {
        AppCommand::List(options) => {
            let catalog = catalog::load_catalog(source, reference).await;
            list::display_list(
                &catalog,
                &options,
                &config.currency.from,
                &config.currency.to,
                config.language,
            )
        }
        AppCommand::Rate { from, to, amount } => {
            let table = catalog::load_rates(source, reference).await?;
            let from = from.as_deref().unwrap_or(&config.currency.from);
            let to = to.as_deref().unwrap_or(&config.currency.to);
            Ok(rates::display_rate(&table, from, to, amount))
        }
        AppCommand::Currencies => {
            let table = catalog::load_rates(source, reference).await?;
            Ok(rates::display_currencies(&table))
        }
        AppCommand::Fields { line } => {
            let (_, products) = catalog::load_products(source).await?;
            Ok(facets::display_fields(&products, line.as_deref()))
        }
        AppCommand::Lines => {
            let (categories, products) = match catalog::load_products(source).await {
                Ok((categories, products)) => (Some(categories), Some(products)),
                Err(e) => {
                    tracing::warn!("{e:#}. Showing default product lines.");
                    (None, None)
                }
            };
            let lines = product_lines_or_fallback(categories);
            Ok(facets::display_lines(&lines, products.as_deref()))
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("globalprice starting...");

    let config = load_config(config_path)?;
    debug!("Loaded config: {config:#?}");
    let source = providers::source_from_config(&config.source)?;

    let spinner = ui::new_spinner("Loading price data...");
    let output = execute(command, &config, source.as_ref()).await;
    spinner.finish_and_clear();

    println!("{}", output?);
    Ok(())
}
