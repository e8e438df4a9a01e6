// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval-augmented letter generation

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use super::prompt::build_prompt;
use super::retriever::{Evidence, Retriever};
use crate::llm::GenerationBackend;

/// A drafted letter with the evidence that grounded it.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedLetter {
    pub text: String,
    pub evidence: Vec<Evidence>,
    #[serde(skip)]
    pub prompt: String,
}

/// Glues retrieval, prompt assembly and the completion call together.
pub struct LetterGenerator<B> {
    retriever: Retriever,
    backend: B,
    model: String,
    top_k: usize,
}

impl<B: GenerationBackend> LetterGenerator<B> {
    pub fn new(retriever: Retriever, backend: B, model: impl Into<String>, top_k: usize) -> Self {
        Self {
            retriever,
            backend,
            model: model.into(),
            top_k,
        }
    }

    /// Retrieves evidence for `request`, builds the prompt and asks the backend.
    ///
    /// Backend failures propagate unchanged.
    pub fn generate(&mut self, request: &str) -> Result<GeneratedLetter> {
        let evidence = self.retriever.retrieve(request, self.top_k)?;
        let prompt = build_prompt(request, &evidence);
        info!(
            model = %self.model,
            evidence = evidence.len(),
            "requesting letter"
        );
        let text = self.backend.generate(&self.model, &prompt)?;
        Ok(GeneratedLetter {
            text,
            evidence,
            prompt,
        })
    }
}
