// SPDX-License-Identifier: MIT OR Apache-2.0

//! Index builder: letters in, aligned artifact out

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::artifact::IndexArtifact;
use super::corpus::{load_documents, DocumentMetadata};
use super::flat::FlatIndex;
use crate::embedding::{EmbeddingProvider, TextChunker};
use crate::errors::RagError;

/// Summary of a successful build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub documents: usize,
    pub chunks: usize,
    pub dimension: usize,
    pub model: String,
    pub out_dir: PathBuf,
}

/// Builds the index artifact from a directory of sample letters.
pub struct IndexBuilder {
    chunker: TextChunker,
    provider: Box<dyn EmbeddingProvider>,
    show_progress: bool,
}

impl IndexBuilder {
    pub fn new(chunker: TextChunker, provider: Box<dyn EmbeddingProvider>) -> Self {
        Self {
            chunker,
            provider,
            show_progress: false,
        }
    }

    /// Draw a progress bar on stderr while embedding.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Chunk, embed and persist every letter in `docs_dir` into `out_dir`.
    ///
    /// Fails with [`RagError::NoChunks`] before touching the filesystem when
    /// the corpus produces no chunks. Otherwise any artifact already in
    /// `out_dir` is overwritten.
    pub fn build(&mut self, docs_dir: &Path, out_dir: &Path) -> Result<BuildReport> {
        let documents = load_documents(docs_dir);

        let mut chunks: Vec<String> = Vec::new();
        let mut metadata: Vec<DocumentMetadata> = Vec::new();
        for doc in &documents {
            for chunk in self.chunker.chunks(&doc.body) {
                chunks.push(chunk.text);
                metadata.push(doc.metadata.clone());
            }
        }

        if chunks.is_empty() {
            return Err(RagError::NoChunks(docs_dir.to_path_buf()).into());
        }

        info!(
            documents = documents.len(),
            chunks = chunks.len(),
            "embedding chunks"
        );
        let embeddings = self.embed_all(&chunks)?;

        let dimension = embeddings.first().map(Vec::len).unwrap_or(0);
        let mut index = FlatIndex::new(dimension);
        for embedding in &embeddings {
            index.add(embedding)?;
        }

        let artifact = IndexArtifact::new(index, chunks, metadata)?;
        artifact.save(out_dir)?;
        info!(out_dir = %out_dir.display(), "index artifact written");

        Ok(BuildReport {
            documents: documents.len(),
            chunks: artifact.len(),
            dimension,
            model: self.provider.model_id().to_string(),
            out_dir: out_dir.to_path_buf(),
        })
    }

    fn embed_all(&mut self, chunks: &[String]) -> Result<Vec<Vec<f32>>> {
        let pb = if self.show_progress {
            let pb = ProgressBar::new(chunks.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{bar:40.cyan/blue}] {pos}/{len} chunks | Embedding {msg}")
                    .expect("valid progress bar template")
                    .progress_chars("##."),
            );
            pb
        } else {
            ProgressBar::hidden()
        };
        pb.set_message(self.provider.model_id().to_string());

        let batch_size = self.provider.batch_size().max(1);
        let mut embeddings = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(batch_size) {
            let vectors = self.provider.embed_texts(batch)?;
            if vectors.len() != batch.len() {
                anyhow::bail!(
                    "Embedding provider returned {} vectors for {} chunks",
                    vectors.len(),
                    batch.len()
                );
            }
            embeddings.extend(vectors);
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();

        Ok(embeddings)
    }
}
