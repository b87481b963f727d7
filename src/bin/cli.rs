//! Question Scraper CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use question_scraper::{
    error::Result,
    models::Config,
    pipeline,
    storage::{LocalStorage, QuestionStorage},
    utils::http,
};

/// Scrapes numbered questions and their images into a local directory
#[derive(Parser, Debug)]
#[command(name = "scraper", version, about = "Concurrent question scraper")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "scraper.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clear the output directory, fetch every question, then download images
    Run {
        /// Remote origin (overrides scraper.base_url)
        #[arg(long)]
        base_url: Option<String>,

        /// First question id (overrides scraper.range_start)
        #[arg(long)]
        start: Option<u32>,

        /// Last question id, inclusive (overrides scraper.range_end)
        #[arg(long)]
        end: Option<u32>,

        /// Worker pool size (overrides scraper.worker_count)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Output directory (overrides output.data_dir)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Skip the image download pass
        #[arg(long)]
        skip_images: bool,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Logging needs the configured level, so the load warning is deferred.
    let loaded = Config::load(&cli.config);
    let level = match &loaded {
        Ok(config) => config.logging.level.clone(),
        Err(_) => "info".to_string(),
    };
    init_logging(cli.verbose, &level);

    let mut config = match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", cli.config.display());
            config
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                cli.config.display(),
                e
            );
            Config::default()
        }
    };

    match cli.command {
        Command::Run {
            base_url,
            start,
            end,
            workers,
            data_dir,
            skip_images,
        } => {
            if let Some(url) = base_url {
                config.scraper.base_url = url;
            }
            if let Some(start) = start {
                config.scraper.range_start = start;
            }
            if let Some(end) = end {
                config.scraper.range_end = end;
            }
            if let Some(workers) = workers {
                config.scraper.worker_count = workers;
            }
            if let Some(dir) = data_dir {
                config.output.data_dir = dir;
            }
            if skip_images {
                config.output.download_images = false;
            }

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            let client = http::create_client(&config.scraper)?;
            let storage: Arc<dyn QuestionStorage> =
                Arc::new(LocalStorage::from_config(&config.output));
            let report = pipeline::run_scraper(&config, storage, &client).await?;

            log::info!(
                "Saved {} of {} questions ({} failed)",
                report.pipeline.persisted.len(),
                report.pipeline.submitted,
                report.pipeline.failures.total() + report.pipeline.write_failures.len()
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            log::info!("✓ Config OK");
            log::info!("Base URL: {}", config.scraper.base_url);
            log::info!(
                "Questions: {}..={} ({} ids)",
                config.scraper.range_start,
                config.scraper.range_end,
                config.scraper.id_count()
            );
            log::info!("Workers: {}", config.scraper.worker_count);
            log::info!("Output: {}", config.output.data_dir.display());
        }
    }

    log::info!("Done!");

    Ok(())
}
