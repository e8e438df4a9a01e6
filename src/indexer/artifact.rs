// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted index artifact: vectors, chunk texts and chunk metadata.
//!
//! The three files live in one directory and are positionally aligned:
//! entry `i` of each describes the same chunk.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::corpus::DocumentMetadata;
use super::flat::FlatIndex;
use crate::errors::RagError;

pub const INDEX_FILE: &str = "index.bin";
pub const CHUNKS_FILE: &str = "chunks.json";
pub const METADATA_FILE: &str = "metadata.json";

/// Locations of the three artifact files inside an index directory.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub index: PathBuf,
    pub chunks: PathBuf,
    pub metadata: PathBuf,
}

impl ArtifactPaths {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            index: dir.join(INDEX_FILE),
            chunks: dir.join(CHUNKS_FILE),
            metadata: dir.join(METADATA_FILE),
            dir,
        }
    }

    /// Fails with `MissingIndex` naming the first absent file.
    pub fn ensure_exists(&self) -> Result<(), RagError> {
        for (path, name) in [
            (&self.index, INDEX_FILE),
            (&self.chunks, CHUNKS_FILE),
            (&self.metadata, METADATA_FILE),
        ] {
            if !path.is_file() {
                return Err(RagError::MissingIndex {
                    dir: self.dir.clone(),
                    missing: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// In-memory form of the artifact.
#[derive(Debug, Clone)]
pub struct IndexArtifact {
    index: FlatIndex,
    chunks: Vec<String>,
    metadata: Vec<DocumentMetadata>,
}

impl IndexArtifact {
    /// Assembles an artifact, rejecting arrays of unequal length.
    pub fn new(
        index: FlatIndex,
        chunks: Vec<String>,
        metadata: Vec<DocumentMetadata>,
    ) -> Result<Self, RagError> {
        if index.len() != chunks.len() || chunks.len() != metadata.len() {
            return Err(RagError::MisalignedArtifact {
                vectors: index.len(),
                chunks: chunks.len(),
                metadata: metadata.len(),
            });
        }
        Ok(Self {
            index,
            chunks,
            metadata,
        })
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn metadata(&self) -> &[DocumentMetadata] {
        &self.metadata
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Writes all three files into `dir`, replacing any previous artifact.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<ArtifactPaths> {
        let paths = ArtifactPaths::new(dir);
        std::fs::create_dir_all(&paths.dir)
            .with_context(|| format!("Failed to create directory: {}", paths.dir.display()))?;

        self.index.write_to(&paths.index)?;
        std::fs::write(&paths.chunks, serde_json::to_vec(&self.chunks)?)
            .with_context(|| format!("Failed to write {}", paths.chunks.display()))?;
        std::fs::write(&paths.metadata, serde_json::to_vec(&self.metadata)?)
            .with_context(|| format!("Failed to write {}", paths.metadata.display()))?;

        Ok(paths)
    }

    /// Loads the artifact from `dir`.
    ///
    /// Existence of all three files is checked before any of them is read.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let paths = ArtifactPaths::new(dir);
        paths.ensure_exists()?;

        let index = FlatIndex::read_from(&paths.index)?;
        let chunks: Vec<String> = read_json(&paths.chunks)?;
        let metadata: Vec<DocumentMetadata> = read_json(&paths.metadata)?;

        Ok(Self::new(index, chunks, metadata)?)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
