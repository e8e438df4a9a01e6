// SPDX-License-Identifier: MIT OR Apache-2.0

//! lomn - Letter of Medical Necessity drafting assistant
//!
//! Retrieval-augmented generation over a folder of sample letters:
//! chunk and embed the letters once, then draft new letters grounded in
//! the closest evidence with a local Ollama model.

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize tracing with LOMN_LOG env var (e.g., LOMN_LOG=debug lomn index)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LOMN_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    match cli.command {
        Commands::Index {
            docs,
            out,
            chunk_size,
            overlap,
            no_progress,
        } => {
            commands::index::run(
                commands::index::IndexArgs {
                    docs,
                    out,
                    chunk_size,
                    overlap,
                    no_progress,
                },
                format,
                cli.compact,
            )?;
        }
        Commands::Query { index, k, once } => {
            commands::query::run(index, k, once, format)?;
        }
        Commands::Generate {
            index,
            k,
            model,
            base_url,
            once,
        } => {
            commands::generate::run(
                commands::generate::GenerateArgs {
                    index,
                    k,
                    model,
                    base_url,
                    once,
                },
                format,
            )?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "lomn", &mut std::io::stdout());
        }
    }

    Ok(())
}
