// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// lomn - Letter of Medical Necessity drafting assistant
///
/// Indexes sample letters, retrieves the closest evidence for a request and
/// drafts a new letter with a local language model.
#[derive(Parser, Debug)]
#[command(name = "lomn")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Compact JSON output (no pretty formatting)
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chunk and embed the sample letters into an index
    Index {
        /// Directory of sample letters (*.json)
        #[arg(short, long)]
        docs: Option<PathBuf>,

        /// Directory to write the index to
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Characters per chunk
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Characters shared by consecutive chunks
        #[arg(long)]
        overlap: Option<usize>,

        /// Hide the embedding progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Show the evidence retrieved for each request
    Query {
        /// Index directory
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Number of evidence chunks to retrieve
        #[arg(short)]
        k: Option<usize>,

        /// Answer a single request and exit instead of reading stdin
        #[arg(long)]
        once: Option<String>,
    },

    /// Draft a letter for each request using retrieved evidence
    Generate {
        /// Index directory
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Number of evidence chunks to retrieve
        #[arg(short)]
        k: Option<usize>,

        /// Generation model name
        #[arg(short, long)]
        model: Option<String>,

        /// Base URL of the Ollama server
        #[arg(long, env = "LOMN_OLLAMA_URL")]
        base_url: Option<String>,

        /// Answer a single request and exit instead of reading stdin
        #[arg(long)]
        once: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_generate_overrides() {
        let cli = Cli::try_parse_from([
            "lomn", "--format", "json", "generate", "-k", "2", "--model", "mistral", "--once",
            "LOMN for IOP",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        match cli.command {
            Commands::Generate { k, model, once, .. } => {
                assert_eq!(k, Some(2));
                assert_eq!(model.as_deref(), Some("mistral"));
                assert_eq!(once.as_deref(), Some("LOMN for IOP"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
