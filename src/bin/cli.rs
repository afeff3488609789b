//! dashview CLI
//!
//! Builds dashboard view models from a live backend or from JSON fixtures.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dashview::{
    config,
    error::{AppError, Result},
    pipeline::{ShapeNormalizer, detect_shape},
    services::Dashboard,
    sources::{DirectoryFetcher, HttpFetcher, SourceFetcher},
};

/// dashview - dashboard response normalization
#[derive(Parser, Debug)]
#[command(
    name = "dashview",
    version,
    about = "Normalize REST responses into dashboard view models"
)]
struct Cli {
    /// Path to the dashboard configuration file
    #[arg(short, long, default_value = "data/dashboard.toml")]
    config: PathBuf,

    /// Path to a locale override file
    #[arg(short, long)]
    locale: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate configuration files
    Validate,

    /// Fetch every source and build the view model
    Build {
        /// Read sources from `{dir}/{path}.json` instead of the backend
        #[arg(long)]
        from_dir: Option<PathBuf>,

        /// Free-text search term
        #[arg(long, default_value = "")]
        search: String,

        /// Categorical filter, repeatable
        #[arg(long, value_name = "FIELD=VALUE")]
        filter: Vec<String>,

        /// Write the view model as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report the envelope shape of a JSON response file
    Inspect {
        file: PathBuf,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn parse_filter(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(AppError::validation(format!(
            "Invalid filter '{}', expected FIELD=VALUE",
            raw
        ))),
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Validate => {
            log::info!("Validating {}...", cli.config.display());

            let (config, locale) = config::load_all(&cli.config, cli.locale.as_deref())?;
            log::info!(
                "✓ Config OK ({} source(s), {} grouping(s), {} stat(s))",
                config.view.sources.len(),
                config.view.groupings.len(),
                config.view.stats.len()
            );
            log::info!("✓ Locale '{}' with {} month names", locale.language, locale.months.len());
        }

        Command::Build {
            from_dir,
            search,
            filter,
            output,
        } => {
            let filters = filter
                .iter()
                .map(|raw| parse_filter(raw))
                .collect::<Result<Vec<_>>>()?;

            let (config, locale) = config::load_all(&cli.config, cli.locale.as_deref())?;
            let fetcher: Box<dyn SourceFetcher> = match from_dir {
                Some(dir) => {
                    log::info!("Reading sources from {}", dir.display());
                    Box::new(DirectoryFetcher::new(dir))
                }
                None => {
                    log::info!("Fetching sources from {}", config.fetch.base_url);
                    Box::new(HttpFetcher::new(&config.fetch)?)
                }
            };

            let mut dashboard = Dashboard::new(config, locale);
            dashboard.load(fetcher.as_ref()).await;
            dashboard.set_search(search);
            for (field, value) in filters {
                dashboard.select(&field, value);
            }

            for failure in dashboard.failures() {
                log::warn!("Source '{}' unavailable: {}", failure.source, failure.message);
            }

            let view = dashboard.view_model();
            for (name, value) in &view.stats {
                log::info!("{}: {}", name, value);
            }
            for (name, index) in &view.indexes {
                log::info!(
                    "Grouping '{}': {} group(s), {} orphan(s)",
                    name,
                    index.len(),
                    index.orphans().len()
                );
            }
            log::info!("{} visible row(s)", view.records.len());

            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&serde_json::json!({
                    "stats": view.stats,
                    "indexes": view.indexes,
                    "rows": dashboard.rows(),
                    "failures": dashboard.failures(),
                }))?;
                std::fs::write(&path, json)?;
                log::info!("View model saved to {}", path.display());
            }
        }

        Command::Inspect { file } => {
            let content = std::fs::read_to_string(&file)?;
            let envelope: serde_json::Value = serde_json::from_str(&content)?;

            let shape = detect_shape(&envelope);
            let records = ShapeNormalizer::new().normalize(&envelope);
            log::info!("{}: {:?}, {} record(s)", file.display(), shape, records.len());
            if shape.is_mismatch() {
                log::warn!("Envelope shape not recognized as a collection");
            }
        }
    }

    Ok(())
}
