// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::GenerationBackend;

/// Client for a local Ollama server (`POST /api/generate`, non-streaming).
pub struct OllamaBackend {
    base_url: String,
    client: Client,
}

impl OllamaBackend {
    /// `timeout_secs == 0` disables the request timeout; local models can
    /// take minutes on a long letter.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Ollama HTTP client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

impl GenerationBackend for OllamaBackend {
    fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let url = self.endpoint();
        debug!(%url, model, prompt_chars = prompt.len(), "calling generation backend");

        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
        };
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .with_context(|| format!("failed to call Ollama at {url}"))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            bail!("Ollama returned {}: {}", status, text);
        }
        let parsed: GenerateResponse = resp.json().context("failed to parse Ollama response")?;
        Ok(parsed.response)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}
