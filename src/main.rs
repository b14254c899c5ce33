#![allow(dead_code)]

mod aggregate;
mod classify;
mod cli;
mod commands;
mod corpus;
mod elf;
mod elf_path;
mod error;
mod extract;
mod features;
mod matching;
mod reader;
mod report;
mod strings;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    // Use RUST_LOG env var if set, otherwise the verbose flag picks the level.
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if args.verbose {
        EnvFilter::new("binsift=debug")
    } else {
        EnvFilter::new("binsift=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    debug!("Logging initialized (verbose={})", args.verbose);

    let output = match &args.command {
        cli::Command::Extract { elfs_dir, out_dir, scan_min_length } => {
            commands::extract_command(elfs_dir, out_dir, *scan_min_length)?
        }
        cli::Command::Classify { from_elfs, out_dir, mode, arch_wildcard } => {
            commands::classify_command(from_elfs, out_dir, *mode, *arch_wildcard)?
        }
        cli::Command::Missing { from_elfs, from_blobs, out_dir } => {
            commands::missing_command(from_elfs, from_blobs, out_dir)?
        }
        cli::Command::Matching { from_elfs, out_dir } => {
            commands::matching_command(from_elfs, out_dir)?
        }
    };

    print!("{output}");
    Ok(())
}
