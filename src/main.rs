use clap::{Parser, Subcommand, builder::styling};
use eyre::Result;
use owo_colors::OwoColorize;
use tripdata_loader::client::{DEFAULT_PART_SIZE, S3Store};
use tripdata_loader::config::Settings;
use tripdata_loader::dataset::{DEFAULT_PREFIX, DEFAULT_YEAR};
use tripdata_loader::pipeline::{ChainRunner, HttpFetcher, UnitStatus, build_chain};

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Tripdata Loader: ships monthly trip-data archives from CSV to Parquet in an object store
#[derive(Parser)]
#[command(name = "tripload", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source configuration from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full chain of twelve monthly units, January through December
    Run {
        /// Dataset year to load
        #[arg(long, default_value_t = DEFAULT_YEAR)]
        year: u16,

        /// Dataset file prefix
        #[arg(long, default_value = DEFAULT_PREFIX)]
        prefix: String,

        /// Flat per-unit retry count for transient failures
        #[arg(long, default_value_t = 1)]
        retries: u32,
    },

    /// Test authorization to the destination object store
    Auth,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if std::path::Path::new(&cli.env).exists() {
        dotenvy::from_filename(&cli.env)?;
    }

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    let settings = Settings::from_env()?;
    log::info!(
        "Tripdata Loader - project {}, bucket {}",
        settings.project_id.bright_black(),
        settings.bucket.bright_black()
    );

    match cli.command {
        Commands::Auth => {
            log::info!("Testing authorization to {}", settings.bucket.cyan());
            let store = S3Store::try_new(&settings, DEFAULT_PART_SIZE).await?;
            store.verify_access().await?;
            log::info!("Authorization {}", "succeeded".green());
        }
        Commands::Run {
            year,
            prefix,
            retries,
        } => {
            log::info!(
                "Running chain for {} {}",
                prefix.bright_black(),
                year.bright_black()
            );
            std::fs::create_dir_all(&settings.work_dir)?;

            let fetcher = HttpFetcher::try_new()?;
            let store = S3Store::try_new(&settings, DEFAULT_PART_SIZE).await?;
            let chain = build_chain(&prefix, year)?;
            let runner =
                ChainRunner::new(&fetcher, &store, &settings.work_dir).with_retries(retries);
            let report = runner.run(&chain).await;

            for outcome in &report.outcomes {
                match &outcome.status {
                    UnitStatus::Succeeded => {
                        log::info!("{} {}", outcome.name, "succeeded".green());
                    }
                    UnitStatus::Failed(error) => {
                        log::error!("{} {}: {error}", outcome.name, "failed".red());
                    }
                }
            }

            if let Some(failed) = report.failed_unit() {
                eyre::bail!("Chain failed at unit {}", failed.name);
            }
            log::info!("Chain {}", "succeeded".green());
        }
    }

    Ok(())
}
