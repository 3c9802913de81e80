use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

use tally_ingest::Bank;

mod categorize;
mod config;
mod convert;
mod state;

use convert::ConvertArgs;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")"),
    about = "Bank statement PDFs to a categorized CSV ledger"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default ~/.tally/config.toml
    Init,

    /// List supported banks
    Banks,

    /// Extract statement PDFs into one CSV ledger
    Convert(ConvertArgs),

    /// Append a Categorization column to statement CSVs
    Categorize {
        /// Statement CSVs with a description-like column
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Keyword table: URL or local CSV (overrides config)
        #[arg(long)]
        master: Option<String>,

        /// Directory for Categorized_<name> outputs (default: next to each input)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Extract, categorize and summarize in one pass
    Run {
        #[command(flatten)]
        convert: ConvertArgs,

        /// Keyword table: URL or local CSV (overrides config)
        #[arg(long)]
        master: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "command failed");
            for cause in err.chain().skip(1) {
                error!(cause = %cause, "caused by");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Init => {
            config::init_config()?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Banks => {
            for bank in Bank::ALL {
                println!("{:<18} {}", bank.id(), bank.name());
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Convert(args) => {
            let cfg = config::load_config()?;
            convert::convert(args, &cfg)
        }

        Command::Categorize { files, master, out_dir } => {
            let cfg = config::load_config()?;
            categorize::categorize(files, master, out_dir, &cfg).await
        }

        Command::Run { convert: args, master } => {
            let cfg = config::load_config()?;
            convert::run(args, master, &cfg).await
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
