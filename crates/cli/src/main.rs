//! scasplens command line
//!
//! Parses saved s(CASP) output, runs programs through the solver, and
//! reports which input predicates a query depends on.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use scasplens_common::config::{AppConfig, ObservabilityConfig};
use scasplens_common::{metrics, IndexNaming};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    author,
    version = env!("CARGO_PKG_VERSION"),
    about = "s(CASP) response parsing and relevance search",
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to config/ layering and SCASP__ variables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse saved solver output and print it as JSON
    Parse {
        /// File holding the solver's output
        file: PathBuf,

        /// Number of answers the run asked for (0 = all)
        #[arg(short, long, default_value_t = 0)]
        answers: usize,
    },

    /// Run a program through the solver
    Query {
        /// s(CASP) program ending in a `?-` query
        program: PathBuf,

        /// Number of answers to ask for (0 = all)
        #[arg(short, long, default_value_t = 1)]
        answers: usize,

        /// Print the first answer's explanation as HTML instead of JSON
        #[arg(long)]
        html: bool,
    },

    /// List the input predicates a query depends on
    Relevant {
        /// s(CASP) program holding the rules
        program: PathBuf,

        /// Query literal, e.g. `mortal(socrates)`
        query: String,

        /// Extra facts appended to the program
        #[arg(long)]
        facts: Option<PathBuf>,

        /// Output results as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Replace `[LIST]` placeholders in an attribute path with index names
    Index {
        /// Attribute path, e.g. `clients[LIST].matters[LIST].value`
        path: String,

        /// Naming scheme (defaults to search.index_naming)
        #[arg(long, value_enum)]
        naming: Option<NamingArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum NamingArg {
    Numbered,
    Legacy,
}

impl From<NamingArg> for IndexNaming {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Numbered => IndexNaming::Numbered,
            NamingArg::Legacy => IndexNaming::Legacy,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            let path = path.to_string_lossy();
            AppConfig::from_file(&path)
                .with_context(|| format!("failed to load configuration from {}", path))
        }
        None => AppConfig::load().context("failed to load configuration"),
    }
}

/// Logs go to stderr; stdout carries command output only
fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if config.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;
    init_tracing(&config.observability);
    metrics::register_metrics();

    tracing::debug!(
        version = scasplens_common::VERSION,
        solver = %config.reasoner.location,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Parse { file, answers } => commands::parse(&file, answers),
        Commands::Query {
            program,
            answers,
            html,
        } => commands::query(&config, &program, answers, html).await,
        Commands::Relevant {
            program,
            query,
            facts,
            json,
        } => commands::relevant(&config, &program, &query, facts.as_deref(), json).await,
        Commands::Index { path, naming } => {
            let naming = naming.map(IndexNaming::from).unwrap_or(config.search.index_naming);
            commands::index(&path, naming)
        }
    }
}
