//! Unique Finder CLI
//!
//! Reconciles a saved source listing page against a live destination.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use scraper::Html;
use unique_finder::{
    error::{AppError, Result},
    models::Config,
    pipeline::{self, CheckOptions},
    sites,
    utils::{http, report},
};

/// Unique Finder - find releases a destination tracker is missing
#[derive(Parser, Debug)]
#[command(
    name = "unique-finder",
    version,
    about = "Finds releases missing from a destination tracker"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a saved source page against a destination
    Check {
        /// Site the page was saved from (HDB, BLU, HDT, PTP)
        #[arg(long)]
        source: Option<String>,

        /// Saved HTML listing page
        #[arg(long)]
        page: PathBuf,

        /// Site to query (HDB, BLU, PTP)
        #[arg(long)]
        destination: String,

        /// Page URL, used to pick the source when --source is omitted
        #[arg(long)]
        url: Option<String>,

        /// Stop after this many candidate groups
        #[arg(long)]
        limit: Option<usize>,

        /// Write the JSON report here
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List known sites and their capabilities
    Sites,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Check {
            source,
            page,
            destination,
            url,
            limit,
            output,
        } => {
            config.validate()?;
            let client = http::create_async_client(&config.http)?;

            report::step(1, 3, "Resolving sites");
            let source_site = match (source.as_deref(), url.as_deref()) {
                (Some(name), _) => sites::source_by_name(name, &config, &client)?,
                (None, Some(url)) => sites::source_for_url(url, &config, &client)?,
                (None, None) => {
                    return Err(AppError::config("either --source or --url is required"));
                }
            }
            .ok_or_else(|| AppError::config("unknown or unsupported source site"))?;
            let destination_site = sites::destination_by_name(&destination, &config, &client)?
                .ok_or_else(|| {
                    AppError::config(format!("{destination} cannot be used as a destination"))
                })?;
            report::sub_item(&format!("source: {}", source_site.name()));
            report::sub_item(&format!("destination: {}", destination_site.name()));

            report::step(2, 3, "Reading source page");
            let html = tokio::fs::read_to_string(&page).await?;
            let document = Html::parse_document(&html);
            report::sub_item(&page.display().to_string());

            report::step(3, 3, "Reconciling");
            let options = CheckOptions { limit };
            let check = pipeline::run_check(
                &config,
                source_site.name(),
                source_site.scan(&document),
                &*destination_site,
                &options,
            )
            .await;

            for entry in check.upload_candidates() {
                log::info!("Upload candidate: {} ({})", entry.identity, entry.outcome);
            }

            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&check)?;
                tokio::fs::write(&path, json).await?;
                log::info!("Report saved to {}", path.display());
            }
        }

        Command::Sites => {
            let client = http::create_async_client(&config.http)?;
            for site in sites::all_sites(&config, &client)? {
                log::info!(
                    "{:<4} source: {:<5} destination: {}",
                    site.name(),
                    site.can_be_source(),
                    site.can_be_destination()
                );
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("Config OK");
        }
    }

    Ok(())
}
