// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lomn index`

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use lomn::config::Config;
use lomn::embedding::{create_provider, ChunkConfig, TextChunker};
use lomn::indexer::IndexBuilder;
use lomn::output::print_json;

use crate::cli::OutputFormat;

pub struct IndexArgs {
    pub docs: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub chunk_size: Option<usize>,
    pub overlap: Option<usize>,
    pub no_progress: bool,
}

pub fn run(args: IndexArgs, format: OutputFormat, compact: bool) -> Result<()> {
    let config = Config::load();
    let docs = args.docs.unwrap_or_else(|| config.index().docs_dir());
    let out = args.out.unwrap_or_else(|| config.index().index_dir());
    let chunk_config = ChunkConfig::new(
        args.chunk_size.unwrap_or_else(|| config.index().chunk_size()),
        args.overlap.unwrap_or_else(|| config.index().chunk_overlap()),
    )?;

    let provider = create_provider(config.embeddings())?;
    let show_progress = format == OutputFormat::Text && !args.no_progress;
    let report = IndexBuilder::new(TextChunker::new(chunk_config), provider)
        .with_progress(show_progress)
        .build(&docs, &out)?;

    match format {
        OutputFormat::Json => print_json(&report, compact)?,
        OutputFormat::Text => {
            println!(
                "{} Indexed {} documents into {} chunks ({}, dim {})",
                "✓".green(),
                report.documents,
                report.chunks.to_string().yellow(),
                report.model,
                report.dimension
            );
            println!("  Saved to {}", report.out_dir.display().to_string().cyan());
        }
    }
    Ok(())
}
