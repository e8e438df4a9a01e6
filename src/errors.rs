// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain errors that callers need to tell apart.
//!
//! Everything else travels as `anyhow::Error` with context attached; these
//! variants are the conditions the CLI and tests match on.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("No chunks were found in {}. Check your JSON folder.", .0.display())]
    NoChunks(PathBuf),

    #[error("Index artifact missing at {} ({missing}). Run `lomn index` first.", .dir.display())]
    MissingIndex { dir: PathBuf, missing: String },

    #[error(
        "Index artifact is misaligned: {vectors} vectors, {chunks} chunks, {metadata} metadata entries"
    )]
    MisalignedArtifact {
        vectors: usize,
        chunks: usize,
        metadata: usize,
    },

    #[error("Embedding dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid chunk configuration: {0}")]
    InvalidChunkConfig(String),

    #[error("Corrupt index file {}: {reason}", .path.display())]
    CorruptIndex { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, RagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_index_mentions_build_step() {
        let err = RagError::MissingIndex {
            dir: PathBuf::from("lomn_index"),
            missing: "index.bin".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("lomn_index"));
        assert!(message.contains("Run `lomn index` first"));
    }

    #[test]
    fn no_chunks_names_directory() {
        let err = RagError::NoChunks(PathBuf::from("letters"));
        assert!(err.to_string().contains("letters"));
    }
}
