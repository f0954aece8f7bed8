mod commands;
mod logging;

use crate::commands::{check, simulate, tabulate, TabulateOptions};
use crate::logging::LogFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stv_tabulator::TieBreakPolicy;

#[derive(Parser)]
#[clap(version, about = "Single transferable vote tabulator")]
struct Opts {
    /// Log output format.
    #[clap(long, value_enum, default_value = "human", global = true)]
    log_format: LogFormat,
    /// Log filter, e.g. "info" or "stv_tabulator=debug". RUST_LOG takes precedence.
    #[clap(long, default_value = "warn", global = true)]
    log_level: String,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tabulate an election document and print the round history.
    Tabulate {
        /// Election document (JSON).
        file: PathBuf,
        /// Print the full result as JSON instead of a table.
        #[clap(long)]
        json: bool,
        /// Override the tie-break policy, e.g. "random:7" or "configured-order:A,B,C".
        #[clap(long)]
        tie_break: Option<TieBreakPolicy>,
        /// Shorthand for a random tie-break with this seed; wins over --tie-break.
        #[clap(long)]
        seed: Option<u64>,
    },
    /// Validate configuration, roster and ballots without tabulating.
    Check {
        /// Election document (JSON).
        file: PathBuf,
    },
    /// Re-run the election under several random tie-break seeds.
    Simulate {
        /// Election document (JSON).
        file: PathBuf,
        /// Comma-separated seeds.
        #[clap(long, value_delimiter = ',', required = true)]
        seeds: Vec<u64>,
    },
}

fn main() {
    let opts = Opts::parse();
    logging::init_logging(opts.log_format, &opts.log_level);

    let outcome = match opts.command {
        Command::Tabulate {
            file,
            json,
            tie_break,
            seed,
        } => {
            let tie_break = seed.map(|seed| TieBreakPolicy::Random { seed }).or(tie_break);
            tabulate(&file, &TabulateOptions { json, tie_break })
        }
        Command::Check { file } => check(&file),
        Command::Simulate { file, seeds } => simulate(&file, &seeds),
    };

    if let Err(e) = outcome {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
