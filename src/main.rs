use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use globalprice::cli::list::ListOptions;
use globalprice::core::log::init_logging;
use globalprice::core::product::FieldValue;
use globalprice::core::sort::SortKey;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn parse_filter(arg: &str) -> Result<(String, FieldValue), String> {
    match arg.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), FieldValue::parse(value)))
        }
        _ => Err(format!("expected field=value, got '{arg}'")),
    }
}

impl From<Commands> for globalprice::AppCommand {
    fn from(cmd: Commands) -> globalprice::AppCommand {
        match cmd {
            Commands::List {
                line,
                countries,
                filters,
                sort,
                desc,
                to,
            } => globalprice::AppCommand::List(ListOptions {
                line,
                countries,
                filters,
                sort,
                descending: desc,
                to_currency: to,
            }),
            Commands::Rate { from, to, amount } => {
                globalprice::AppCommand::Rate { from, to, amount }
            }
            Commands::Currencies => globalprice::AppCommand::Currencies,
            Commands::Fields { line } => globalprice::AppCommand::Fields { line },
            Commands::Lines => globalprice::AppCommand::Lines,
            Commands::Setup | Commands::Index { .. } => {
                unreachable!("Setup and index commands should be handled separately")
            }
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List product prices across countries
    List {
        /// Product line, e.g. iPhone
        #[arg(short, long)]
        line: Option<String>,
        /// Only show these countries (repeatable)
        #[arg(long = "country")]
        countries: Vec<String>,
        /// Only show products whose field has this value (repeatable)
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, FieldValue)>,
        /// Sort by price, refund or any product field
        #[arg(short, long)]
        sort: Option<SortKey>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Currency to convert prices into
        #[arg(long)]
        to: Option<String>,
    },
    /// Show the exchange rate between two currencies
    Rate {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        /// Amount to convert
        #[arg(short, long, default_value_t = 1.0)]
        amount: f64,
    },
    /// List currencies in the rate snapshot
    Currencies,
    /// List filterable fields and their values
    Fields {
        #[arg(short, long)]
        line: Option<String>,
    },
    /// List product lines
    Lines,
    /// Generate index files for a prices directory
    Index { prices_dir: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => globalprice::cli::setup::setup(),
        Some(Commands::Index { prices_dir }) => globalprice::cli::index::run_index(&prices_dir),
        Some(cmd) => globalprice::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
