//! catloader CLI - Command-line interface
//!
//! This binary provides a command-line interface to the catloader library.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::browse::BrowseArgs;
use commands::common::RequestArgs;
use commands::config::ConfigCommands;
use commands::page::PageArgs;
use error::CliError;
use runner::{CliRunner, RemoteArgs};

#[derive(Parser)]
#[command(name = "catloader")]
#[command(version = catloader::VERSION)]
#[command(about = "Browse paged tabular catalogs served over HTTP", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    remote: RemoteArgs,

    /// Mirror log output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a dataset's columns and row count
    Describe {
        /// Dataset identifier (with or without the catalogs/ prefix)
        dataset: String,
    },

    /// Load one page of a dataset
    Page {
        /// Dataset identifier (with or without the catalogs/ prefix)
        dataset: String,

        #[command(flatten)]
        request: RequestArgs,

        /// Serve the dataset from a JSON array of rows instead of the server
        #[arg(long)]
        local: Option<PathBuf>,

        /// Print cache statistics to stderr afterwards
        #[arg(long)]
        stats: bool,
    },

    /// Page through a dataset interactively, reading commands from stdin
    Browse {
        /// Dataset identifier (with or without the catalogs/ prefix)
        dataset: String,

        #[command(flatten)]
        request: RequestArgs,

        /// Serve the dataset from a JSON array of rows instead of the server
        #[arg(long)]
        local: Option<PathBuf>,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        e.exit();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        command,
        remote,
        verbose,
        json,
    } = cli;

    match command {
        Commands::Config { command } => commands::config::run(command),
        Commands::Describe { dataset } => {
            let runner = CliRunner::new(verbose)?;
            commands::describe::run(&runner, &remote, &dataset, json).await
        }
        Commands::Page {
            dataset,
            request,
            local,
            stats,
        } => {
            let runner = CliRunner::new(verbose)?;
            let args = PageArgs {
                dataset,
                request,
                local,
                stats,
                json,
            };
            commands::page::run(&runner, &remote, args).await
        }
        Commands::Browse {
            dataset,
            request,
            local,
        } => {
            let runner = CliRunner::new(verbose)?;
            let args = BrowseArgs {
                dataset,
                request,
                local,
                json,
            };
            commands::browse::run(&runner, &remote, args).await
        }
    }
}
