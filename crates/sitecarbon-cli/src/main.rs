//! `sitecarbon`: estimate and rank the carbon footprint of web pages.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sitecarbon::models::ONE_BYTE;
use sitecarbon::{Catalog, Coordinator};
use sitecarbon_cli::advisor::AdvisoryClient;
use sitecarbon_cli::cli::output::Styled;
use sitecarbon_cli::cli::{self, ConfigOverrides};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "sitecarbon", version, about = "Estimate and rank the carbon footprint of web pages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print machine-readable JSON to stdout.
    #[arg(long, global = true)]
    json: bool,

    /// Suppress progress output.
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Debug logging and timing details.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[arg(long, global = true)]
    no_color: bool,

    /// Simulated provider latency in milliseconds.
    #[arg(long, global = true)]
    latency_ms: Option<u64>,

    /// Per-analysis timeout in milliseconds.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Seed for reproducible simulated metrics.
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single URL.
    Analyze {
        url: String,

        /// Model used for the highlighted grade and the tip prompt.
        #[arg(long, default_value = ONE_BYTE)]
        model: String,

        /// Ask the advisory endpoint for reduction tips.
        #[arg(long)]
        tips: bool,

        /// Advisory endpoint (defaults to SITECARBON_ADVISOR_URL).
        #[arg(long)]
        advisor_url: Option<String>,

        /// Estimate parameter preset: none or canada-returning.
        #[arg(long)]
        params: Option<String>,
    },
    /// Analyze the catalog and rank it by estimated emissions.
    Rank {
        #[arg(long, default_value = ONE_BYTE)]
        model: String,

        /// Only show one category, e.g. SKIN.
        #[arg(long)]
        category: Option<String>,

        /// JSON catalog file; the built-in catalog is used otherwise.
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Maximum concurrent analyses.
        #[arg(long)]
        max_concurrent: Option<usize>,
    },
    /// List registered emissions models.
    Models,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.json {
        std::env::set_var("SITECARBON_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("SITECARBON_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("SITECARBON_VERBOSE", "1");
    }
    if cli.no_color {
        std::env::set_var("SITECARBON_NO_COLOR", "1");
    }

    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("  {} {e:#}", Styled::new().fail_sym());
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "sitecarbon=debug" } else { "sitecarbon=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Cli) -> Result<()> {
    let mut overrides = ConfigOverrides {
        latency_ms: args.latency_ms,
        timeout_ms: args.timeout_ms,
        seed: args.seed,
        max_concurrent: None,
        params: None,
    };

    match args.command {
        Commands::Analyze {
            url,
            model,
            tips,
            advisor_url,
            params,
        } => {
            overrides.params = params;
            let config = cli::engine_config(&overrides)?;
            let coordinator = Coordinator::from_config(&config, Catalog::builtin())?;
            let advisor = if tips {
                let client = match advisor_url {
                    Some(endpoint) => AdvisoryClient::new(&endpoint),
                    None => AdvisoryClient::from_env().context(
                        "--tips needs --advisor-url or SITECARBON_ADVISOR_URL",
                    )?,
                };
                debug!(endpoint = client.endpoint(), "advisor configured");
                Some(client)
            } else {
                None
            };
            cli::analyze_cmd::run(&coordinator, &url, &model, advisor.as_ref()).await
        }
        Commands::Rank {
            model,
            category,
            catalog,
            max_concurrent,
        } => {
            overrides.max_concurrent = max_concurrent;
            let config = cli::engine_config(&overrides)?;
            let catalog = match catalog {
                Some(path) => Catalog::from_path(&path)
                    .with_context(|| format!("failed to load catalog {}", path.display()))?,
                None => Catalog::builtin(),
            };
            let coordinator = Coordinator::from_config(&config, catalog)?;
            cli::rank_cmd::run(&coordinator, &model, category.as_deref()).await
        }
        Commands::Models => {
            let registry = sitecarbon::ModelRegistry::standard();
            cli::models_cmd::run(&registry)
        }
    }
}
