// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lomn generate`: retrieve, prompt, draft

use anyhow::Result;
use std::path::PathBuf;

use lomn::config::Config;
use lomn::llm::OllamaBackend;
use lomn::output::{use_colors, write_letter};
use lomn::query::LetterGenerator;

use super::{drive, open_index, write_json_line};
use crate::cli::OutputFormat;

pub struct GenerateArgs {
    pub index: Option<PathBuf>,
    pub k: Option<usize>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub once: Option<String>,
}

pub fn run(args: GenerateArgs, format: OutputFormat) -> Result<()> {
    let config = Config::load();
    let generation = config.generation();
    let retriever = open_index(&config, args.index)?;

    let base_url = args
        .base_url
        .unwrap_or_else(|| generation.base_url().to_string());
    let backend = OllamaBackend::new(base_url, generation.timeout_secs())?;
    let model = args.model.unwrap_or_else(|| generation.model().to_string());
    let k = args.k.unwrap_or_else(|| config.retrieval().top_k());
    let mut generator = LetterGenerator::new(retriever, backend, model, k);

    let preview_chars = config.retrieval().preview_chars();
    let use_color = use_colors();

    drive(
        args.once,
        "Describe the LOMN you need (q to quit): ",
        format,
        |request, out| {
            let letter = generator.generate(request)?;
            match format {
                OutputFormat::Json => write_json_line(out, &letter),
                OutputFormat::Text => {
                    write_letter(out, &letter, preview_chars, use_color)?;
                    Ok(())
                }
            }
        },
    )
}
