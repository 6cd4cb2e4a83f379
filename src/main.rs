use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use shinylive_lib::exit_codes::exit;
use shinylive_lib::{FilterError, Language};

mod commands;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format pandoc passes to JSON filters (informational)
    #[arg(required = false)]
    target_format: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Relative path from the page to the project root
    #[arg(long, env = "SHINYLIVE_PROJECT_OFFSET")]
    project_offset: Option<String>,

    /// Read the pandoc JSON document from a file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Write the filtered document to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the collected dependencies to this JSON file
    #[arg(long)]
    dependencies_out: Option<PathBuf>,

    /// Show detailed output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode
    #[arg(short, long)]
    quiet: bool,

    /// Command to run
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the shinylive tools and check they can be used together
    Info {
        /// Languages to query (python, r)
        #[arg(required = true)]
        languages: Vec<String>,
    },
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    // stdout carries the document, so logs always go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Some(Commands::Info { languages }) => languages
            .iter()
            .map(|name| name.parse::<Language>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(anyhow::Error::from)
            .and_then(|languages| commands::info::handle_info(&cli, &languages)),
        None => commands::filter::handle_filter(&cli),
    };

    if let Err(err) = result {
        eprintln!("{}: {err:#}", "Error".red().bold());
        match err.downcast_ref::<FilterError>() {
            Some(e) if e.is_configuration_error() => exit::config_error(),
            _ => exit::build_failed(),
        }
    }
    exit::success();
}
