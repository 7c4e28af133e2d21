//! `spinchain` command-line driver.
//!
//! ```text
//! spinchain run      -n 3 --delta-t 3 --total-time 9 --drive-frequency 0.0048
//! spinchain reduce   results --format csv
//! spinchain program  --total-time 3 --lower
//! spinchain backends
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod store;

use commands::{backends, program, reduce, run};
use config::RunArgs;

/// Trotterised driven Ising chain runs
#[derive(Parser)]
#[command(name = "spinchain")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve the chain over the time grid and record outcome tables
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Reduce a run directory to a magnetisation series
    Reduce {
        /// Run directory holding outcomes.jsonl and manifest.json
        input: PathBuf,

        /// Output format (csv, json)
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print one evolution program as JSON
    Program {
        #[command(flatten)]
        args: RunArgs,

        /// Evolve to this time instead of the total time
        #[arg(long)]
        time: Option<f64>,

        /// Lower rotations to H, CX and Rz
        #[arg(long)]
        lower: bool,
    },

    /// List available backends
    Backends,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run { args } => run::execute(&args).await,
        Commands::Reduce {
            input,
            format,
            output,
        } => reduce::execute(&input, &format, output.as_deref()).await,
        Commands::Program { args, time, lower } => program::execute(&args, time, lower).await,
        Commands::Backends => backends::execute().await,
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
