//! # SDGP Context CLI (`sdgp`)
//!
//! The `sdgp` binary ranks SDGP project records against a query, maintains
//! the summary cache, and runs question answering over the dataset.
//!
//! ## Usage
//!
//! ```bash
//! sdgp --config ./config/sdgp.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sdgp ask "<question>"` | Answer one question |
//! | `sdgp chat` | Interactive question loop |
//! | `sdgp context "<query>"` | Print the context block for a query |
//! | `sdgp search "<query>"` | Print ranked matches |
//! | `sdgp get <id>` | Full detail page for a project |
//! | `sdgp find "<title>"` | Detail page for the first title match |
//! | `sdgp warm` | Fill the summary cache |
//! | `sdgp stats` | Summary cache statistics |
//! | `sdgp cache clear` | Delete all cached summaries |
//! | `sdgp cache export` | Export cached summaries to JSON |
//! | `sdgp report` | Dataset statistics or a per-domain listing |
//!
//! Logging goes to stderr and honours `RUST_LOG`; `--verbose` raises the
//! default level from `warn` to `info`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sdgp_context::config;
use sdgp_context::harness::ProjectHarness;
use sdgp_context::progress::ProgressMode;
use sdgp_context::{chat, export, get, report, search, stats, warm};

/// SDGP Context CLI: cached summaries, relevance ranking, and AI chat over
/// SDGP project records.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the file does not exist, built-in defaults are used.
#[derive(Parser)]
#[command(
    name = "sdgp",
    about = "SDGP Context: a local-first context engine for AI chat over SDGP project records",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/sdgp.toml")]
    config: PathBuf,

    /// Log at info level (default: warn). `RUST_LOG` takes precedence.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question using the configured generator.
    Ask {
        /// The question.
        question: String,
    },

    /// Start an interactive chat session.
    Chat,

    /// Print the context block that would be sent to the generator.
    Context {
        /// The query string. An empty query prints the dataset overview.
        #[arg(default_value = "")]
        query: String,
    },

    /// Rank projects against a query and print the matches.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results (default: retrieval.top_k).
        #[arg(long)]
        limit: Option<usize>,

        /// Show the per-signal score breakdown.
        #[arg(long)]
        explain: bool,
    },

    /// Print the full detail page for a project id.
    Get {
        /// Project id.
        id: String,
    },

    /// Print the detail page for the first project whose title matches.
    Find {
        /// Title or title fragment (case-insensitive).
        title: String,
    },

    /// Summarize every project whose cached summary is missing or stale.
    Warm {
        /// Progress output on stderr: `human`, `json`, or `off`.
        /// Defaults to `human` on a terminal, otherwise `off`.
        #[arg(long)]
        progress: Option<String>,
    },

    /// Show summary cache statistics.
    Stats,

    /// Manage the summary cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Print dataset statistics, or the projects in one domain.
    Report {
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,

        /// List projects tagged with this domain, newest first.
        #[arg(long)]
        domain: Option<String>,

        /// Maximum projects listed with `--domain` (default: 10).
        #[arg(long, requires = "domain")]
        limit: Option<usize>,

        /// Save the report to a file instead of printing it. Without a
        /// value, writes `sdgp_analysis_report_<timestamp>.txt`.
        #[arg(long)]
        output: Option<Option<PathBuf>>,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Delete every cached summary and both cache files.
    Clear,

    /// Export cached summaries and metadata to a JSON file.
    Export {
        /// Output path (default: `ai_summaries_export_<timestamp>.json`).
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Ask { question } => {
            chat::run_ask(&cfg, &question).await?;
        }
        Commands::Chat => {
            chat::run_chat(&cfg).await?;
        }
        Commands::Context { query } => {
            let harness = ProjectHarness::from_config(&cfg)?;
            println!("{}", harness.get_context(&query).await);
        }
        Commands::Search {
            query,
            limit,
            explain,
        } => {
            search::run_search(&cfg, &query, limit, explain).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, &id).await?;
        }
        Commands::Find { title } => {
            get::run_find(&cfg, &title).await?;
        }
        Commands::Warm { progress } => {
            let mode = match progress.as_deref() {
                None => ProgressMode::default_for_tty(),
                Some(value) => ProgressMode::parse(value).ok_or_else(|| {
                    anyhow::anyhow!("Unknown progress mode: {}. Use human, json, or off.", value)
                })?,
            };
            warm::run_warm(&cfg, mode).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Cache { action } => match action {
            CacheAction::Clear => {
                export::run_clear(&cfg).await?;
            }
            CacheAction::Export { output } => {
                export::run_export(&cfg, output.as_deref()).await?;
            }
        },
        Commands::Report {
            json,
            domain,
            limit,
            output,
        } => {
            let opts = report::ReportOptions {
                json,
                domain,
                limit,
                output,
            };
            report::run_report(&cfg, &opts).await?;
        }
    }

    Ok(())
}
