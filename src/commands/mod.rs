// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations for the lomn binary

pub mod generate;
pub mod index;
pub mod query;

use anyhow::Result;
use std::io::{self, Write};
use std::path::PathBuf;

use lomn::config::Config;
use lomn::embedding::create_provider;
use lomn::query::{open_retriever, run_loop, Retriever};

use crate::cli::OutputFormat;

/// Opens the index named on the command line, or the configured one.
fn open_index(config: &Config, index: Option<PathBuf>) -> Result<Retriever> {
    let dir = index.unwrap_or_else(|| config.index().index_dir());
    let embeddings = config.embeddings().clone();
    open_retriever(&dir, || create_provider(&embeddings))
}

/// Runs `handle` once for `once`, or over stdin until an exit word.
fn drive<F>(once: Option<String>, prompt: &str, format: OutputFormat, mut handle: F) -> Result<()>
where
    F: FnMut(&str, &mut io::StdoutLock<'static>) -> Result<()>,
{
    let mut out = io::stdout().lock();
    if let Some(request) = once {
        handle(request.trim(), &mut out)?;
        return out.flush().map_err(Into::into);
    }

    let prompt = match format {
        OutputFormat::Text => prompt,
        OutputFormat::Json => "",
    };
    let stdin = io::stdin().lock();
    run_loop(stdin, &mut out, prompt, handle)?;
    Ok(())
}

/// Writes one JSON document per line.
fn write_json_line<W: Write, T: serde::Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
