// SPDX-License-Identifier: MIT OR Apache-2.0

//! Indexing flow: load letters, chunk, embed, persist

pub mod artifact;
pub mod builder;
pub mod corpus;
pub mod flat;

pub use artifact::{ArtifactPaths, IndexArtifact};
pub use builder::{BuildReport, IndexBuilder};
pub use corpus::{load_documents, DocumentMetadata, SourceDocument};
pub use flat::{FlatIndex, Neighbor};
