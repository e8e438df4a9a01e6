// SPDX-License-Identifier: MIT OR Apache-2.0

//! Nearest-neighbor retrieval over a built index artifact

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::embedding::EmbeddingProvider;
use crate::indexer::{ArtifactPaths, DocumentMetadata, IndexArtifact};

/// One retrieved chunk with the metadata of the letter it came from.
#[derive(Debug, Clone, Serialize)]
pub struct Evidence {
    /// 1-based rank in the result list
    pub rank: usize,
    /// Squared L2 distance to the query
    pub distance: f32,
    pub text: String,
    pub metadata: DocumentMetadata,
}

/// Owns a loaded artifact and the provider used to embed queries.
///
/// Construction is the explicit load step; call [`Retriever::reload`] after
/// rebuilding the index to pick up the new artifact.
pub struct Retriever {
    index_dir: PathBuf,
    artifact: IndexArtifact,
    provider: Box<dyn EmbeddingProvider>,
}

impl Retriever {
    /// Loads the artifact in `index_dir`.
    ///
    /// Fails with `RagError::MissingIndex` if any artifact file is absent.
    pub fn open(index_dir: impl AsRef<Path>, provider: Box<dyn EmbeddingProvider>) -> Result<Self> {
        let index_dir = index_dir.as_ref().to_path_buf();
        let artifact = IndexArtifact::load(&index_dir)?;
        debug!(
            chunks = artifact.len(),
            dim = artifact.index().dim(),
            "index artifact loaded"
        );
        Ok(Self {
            index_dir,
            artifact,
            provider,
        })
    }

    /// Re-reads the artifact from disk.
    pub fn reload(&mut self) -> Result<()> {
        self.artifact = IndexArtifact::load(&self.index_dir)?;
        Ok(())
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.artifact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifact.is_empty()
    }

    /// Returns the `k` chunks nearest to `query`, closest first.
    ///
    /// `k` is clamped to the number of indexed chunks.
    pub fn retrieve(&mut self, query: &str, k: usize) -> Result<Vec<Evidence>> {
        // Re-check the files so a deleted artifact surfaces as MissingIndex
        // instead of silently serving stale data.
        ArtifactPaths::new(&self.index_dir).ensure_exists()?;

        let k = k.min(self.artifact.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.provider.embed_one(query)?;
        let neighbors = self.artifact.index().search(&query_vector, k)?;

        Ok(neighbors
            .into_iter()
            .enumerate()
            .map(|(i, neighbor)| Evidence {
                rank: i + 1,
                distance: neighbor.distance,
                text: self.artifact.chunks()[neighbor.position].clone(),
                metadata: self.artifact.metadata()[neighbor.position].clone(),
            })
            .collect())
    }
}

/// Opens the artifact at `index_dir`, checking for it before the provider is built.
///
/// Loading an embedding model can be slow; this avoids doing so for an
/// index that does not exist.
pub fn open_retriever<F>(index_dir: impl AsRef<Path>, make_provider: F) -> Result<Retriever>
where
    F: FnOnce() -> Result<Box<dyn EmbeddingProvider>>,
{
    ArtifactPaths::new(index_dir.as_ref()).ensure_exists()?;
    Retriever::open(index_dir, make_provider()?)
}
