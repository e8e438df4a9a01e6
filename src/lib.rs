// SPDX-License-Identifier: MIT OR Apache-2.0

//! lomn - Letter of Medical Necessity retrieval-augmented generation
//!
//! Shared modules for the lomn CLI and the lomn-train service.

pub mod config;
pub mod embedding;
pub mod errors;
pub mod indexer;
pub mod llm;
pub mod output;
pub mod query;
pub mod training;
