//! ujquery CLI - Main entry point
//!
//! Prints the user journey queries for K8s API audit logs.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use ujquery_cli::config::{Config, Format};
use ujquery_cli::error::CliError;
use ujquery_cli::{commands, output};
use ujquery_core::catalog::{self, NamedQuery};

/// ujquery - User journey query generator
#[derive(Parser, Debug)]
#[command(name = "ujquery")]
#[command(author, version, about = "Prints log-search queries extracting user journey events from K8s audit records", long_about = None)]
struct Cli {
    /// Path to config file (default: ujquery.toml, if present)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Index to search for audit records
    #[arg(long, global = true, env = "UJQUERY_INDEX", value_name = "INDEX")]
    index: Option<String>,

    /// Print queries separated by NUL characters, without titles
    #[arg(short = '0', long = "machine")]
    machine: bool,

    /// Print only the named query (repeatable)
    #[arg(short, long = "query", value_name = "NAME")]
    query: Vec<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
enum Command {
    /// List query names and titles
    List,
}

fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", output::err_line(&e.to_string()));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Command::List) => {
            commands::list::run(&catalog::CATALOG.iter().collect::<Vec<_>>());
            Ok(())
        }
        None => {
            let queries = select_queries(&config, &cli.query)?;
            let index = cli.index.as_deref().unwrap_or_else(|| config.index());
            let format = if cli.machine {
                Format::Machine
            } else {
                config.format()
            };
            let registry = config.registry();
            commands::print::run(&queries, index, &registry, format)
        }
    }
}

/// Load the explicit config file, or the default one when it exists
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config, CliError> {
    let config = match custom_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

/// Queries named on the command line, in catalog order, falling back to the
/// configured subset
fn select_queries(config: &Config, names: &[String]) -> Result<Vec<&'static NamedQuery>, CliError> {
    if names.is_empty() {
        return Ok(config.selected_queries());
    }
    if let Some(unknown) = names.iter().find(|n| catalog::find(n).is_none()) {
        return Err(CliError::UnknownQuery(unknown.clone()));
    }
    Ok(catalog::CATALOG
        .iter()
        .filter(|q| names.iter().any(|n| n == q.name))
        .collect())
}
