// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text-completion backends used to draft letters.

use anyhow::Result;

mod ollama;

pub use ollama::OllamaBackend;

/// Trait implemented by completion backends.
///
/// The returned text is passed through untouched: no retry, no validation.
pub trait GenerationBackend {
    fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}
