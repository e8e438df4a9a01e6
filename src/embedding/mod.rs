// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding module - chunking and vector embeddings for retrieval
//!
//! Letter bodies are cut into overlapping character windows and every window
//! is embedded with the same provider at build time and at query time.

pub mod chunker;
pub mod provider;

pub use chunker::{ChunkConfig, Chunks, TextChunk, TextChunker};
pub use provider::{
    create_provider, CommandProvider, EmbeddingProvider, EmbeddingProviderConfig, FastEmbedder,
    HashProvider,
};
