use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cryptofolio::config::{default_config_path, ResolvedConfig};
use cryptofolio::credentials::{get_required_secret, EnvCredentialStore};
use cryptofolio::market::CoinMarketCapProvider;
use cryptofolio::output::{CsvReportWriter, ReportWriter, TableReportWriter};
use cryptofolio::portfolio::PortfolioService;
use cryptofolio::sources::{build_sources, SourceFilter};
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "cryptofolio")]
#[command(about = "Crypto portfolio valuation reports")]
struct Cli {
    /// Path to config file.
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a portfolio valuation report
    Report {
        /// Exchanges to include: "all" or a comma-separated list of names.
        #[arg(long, default_value = "all", value_delimiter = ',')]
        exchanges: Vec<String>,

        /// Networks to include: "all" or a comma-separated list of names.
        #[arg(long, default_value = "all", value_delimiter = ',')]
        networks: Vec<String>,

        /// Include the manual holdings file.
        #[arg(long)]
        include_manual: bool,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Where report files are written (overrides the configured directory).
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Show current configuration
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Formatted table on stdout.
    Table,
    /// Timestamped CSV file in the output directory.
    Csv,
}

/// "all" anywhere in the list selects everything.
fn filter_names(values: Vec<String>) -> Option<Vec<String>> {
    if values.iter().any(|value| value.eq_ignore_ascii_case("all")) {
        None
    } else {
        Some(values)
    }
}

async fn run_report(
    config: &ResolvedConfig,
    exchanges: Vec<String>,
    networks: Vec<String>,
    include_manual: bool,
    format: OutputFormat,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let filter = SourceFilter {
        exchanges: filter_names(exchanges),
        networks: filter_names(networks),
        include_manual,
    };

    let credentials = EnvCredentialStore::new();
    let sources = build_sources(config, &filter, &credentials).await?;
    if sources.is_empty() {
        warn!("No sources selected; the report will be empty");
    }

    let api_key = get_required_secret(&credentials, &config.market_data.api_key_env)
        .await
        .context("Cannot configure market data provider")?;
    let provider = Arc::new(CoinMarketCapProvider::new(api_key));

    let service = PortfolioService::new(sources).with_provider(provider);
    let report = service.generate_report().await?;

    let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
    let writer: Box<dyn ReportWriter> = match format {
        OutputFormat::Table => Box::new(TableReportWriter::new()),
        OutputFormat::Csv => Box::new(CsvReportWriter::new(output_dir)),
    };
    writer.write(&report).await
}

fn print_config(config_path: &Path, config: &ResolvedConfig) {
    println!("Config file: {}", config_path.display());
    println!("Output directory: {}", config.output_dir.display());

    if config.exchanges.is_empty() {
        println!("Exchanges: none configured");
    } else {
        println!("Exchanges:");
        for exchange in &config.exchanges {
            println!("  {}", exchange.name());
        }
    }

    if config.networks.is_empty() {
        println!("Networks: none configured");
    } else {
        println!("Networks:");
        for network in &config.networks {
            println!("  {}", network.name());
        }
    }

    match &config.manual {
        Some(manual) => println!("Manual holdings: {}", manual.path.display()),
        None => println!("Manual holdings: not configured"),
    }
    println!("Market data key env: {}", config.market_data.api_key_env);
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already be populated.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();

    let config = ResolvedConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;

    match cli.command {
        Command::Report {
            exchanges,
            networks,
            include_manual,
            format,
            output_dir,
        } => {
            run_report(
                &config,
                exchanges,
                networks,
                include_manual,
                format,
                output_dir,
            )
            .await
        }
        Command::Config => {
            print_config(&cli.config, &config);
            Ok(())
        }
    }
}
