// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lomn query`: retrieval only, no generation

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

use lomn::config::Config;
use lomn::output::{colorize_heading, use_colors, write_evidence};
use lomn::query::Evidence;

use super::{drive, open_index, write_json_line};
use crate::cli::OutputFormat;

#[derive(Serialize)]
struct QueryResult<'a> {
    request: &'a str,
    evidence: &'a [Evidence],
}

pub fn run(
    index: Option<PathBuf>,
    k: Option<usize>,
    once: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let config = Config::load();
    let mut retriever = open_index(&config, index)?;
    let k = k.unwrap_or_else(|| config.retrieval().top_k());
    let preview_chars = config.retrieval().preview_chars();
    let use_color = use_colors();

    drive(once, "Query (q to quit): ", format, |request, out| {
        let evidence = retriever.retrieve(request, k)?;
        match format {
            OutputFormat::Json => write_json_line(
                out,
                &QueryResult {
                    request,
                    evidence: &evidence,
                },
            ),
            OutputFormat::Text => {
                if evidence.is_empty() {
                    writeln!(out, "{} No evidence retrieved", "✗".red())?;
                    return Ok(());
                }
                let heading = format!("Top {} evidence for: {}", evidence.len(), request);
                writeln!(out, "\n{}\n", colorize_heading(&heading, use_color))?;
                write_evidence(out, &evidence, preview_chars, use_color)?;
                Ok(())
            }
        }
    })
}
