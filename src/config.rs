// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file support for lomn
//!
//! Loads configuration from .lomnrc.toml in current directory or ~/.config/lomn/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Embedding provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderType {
    /// fastembed all-MiniLM-L6-v2
    #[default]
    Builtin,
    Command,
    Hash,
}

/// Indexing configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory holding the sample letters (*.json)
    pub docs_dir: Option<PathBuf>,
    /// Directory the index artifact is written to and read from
    pub index_dir: Option<PathBuf>,
    /// Characters per chunk
    pub chunk_size: Option<usize>,
    /// Overlapping characters between chunks
    pub chunk_overlap: Option<usize>,
}

impl IndexConfig {
    /// Get documents directory (defaults to "data/lomn_json")
    pub fn docs_dir(&self) -> PathBuf {
        self.docs_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("data/lomn_json"))
    }

    /// Get index directory (defaults to "lomn_index")
    pub fn index_dir(&self) -> PathBuf {
        self.index_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("lomn_index"))
    }

    /// Get chunk size (defaults to 500)
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
            .unwrap_or(crate::embedding::chunker::DEFAULT_CHUNK_SIZE)
    }

    /// Get chunk overlap (defaults to 50)
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
            .unwrap_or(crate::embedding::chunker::DEFAULT_CHUNK_OVERLAP)
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider type (builtin, command, hash)
    pub provider: Option<EmbeddingProviderType>,
    /// Model identifier for the embedding provider
    pub model: Option<String>,
    /// Command to execute for command provider
    pub command: Option<String>,
    /// Vector dimension for the hash provider
    pub dimension: Option<usize>,
}

impl EmbeddingConfig {
    /// Get provider type (defaults to Builtin)
    pub fn provider(&self) -> EmbeddingProviderType {
        self.provider.unwrap_or_default()
    }

    /// Get model identifier (defaults to "all-MiniLM-L6-v2")
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or("all-MiniLM-L6-v2")
    }

    /// Get command (defaults to "embedder")
    pub fn command(&self) -> &str {
        self.command.as_deref().unwrap_or("embedder")
    }

    /// Get hash dimension (defaults to 256)
    pub fn dimension(&self) -> usize {
        self.dimension
            .unwrap_or(crate::embedding::provider::DEFAULT_HASH_DIM)
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of evidence chunks to retrieve
    pub top_k: Option<usize>,
    /// Characters of each evidence chunk shown in the CLI
    pub preview_chars: Option<usize>,
}

impl RetrievalConfig {
    /// Get top k (defaults to 4)
    pub fn top_k(&self) -> usize {
        self.top_k.unwrap_or(4)
    }

    /// Get preview length (defaults to 300)
    pub fn preview_chars(&self) -> usize {
        self.preview_chars.unwrap_or(300)
    }
}

/// Generation backend configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base URL of the Ollama server
    pub base_url: Option<String>,
    /// Model identifier passed to the backend
    pub model: Option<String>,
    /// Request timeout in seconds (0 disables the timeout)
    pub timeout_secs: Option<u64>,
}

impl GenerationConfig {
    /// Get base URL (defaults to "http://localhost:11434")
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or("http://localhost:11434")
    }

    /// Get model (defaults to "llama3")
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or("llama3")
    }

    /// Get timeout in seconds (defaults to 0, no timeout)
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(0)
    }
}

/// Training service configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Address the service binds to
    pub bind: Option<String>,
    /// JSONL file of the train split
    pub train_file: Option<PathBuf>,
    /// JSONL file of the validation split
    pub validation_file: Option<PathBuf>,
    /// Pretrained checkpoint to fine-tune
    pub base_model: Option<String>,
    /// Directory for intermediate checkpoints
    pub output_dir: Option<PathBuf>,
    /// Directory the final model is saved to
    pub model_dir: Option<PathBuf>,
    /// Directory for trainer logs
    pub logging_dir: Option<PathBuf>,
    /// External trainer command, receives the job spec as JSON on stdin
    pub command: Option<String>,
}

impl TrainingConfig {
    /// Get bind address (defaults to "0.0.0.0:8000")
    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or("0.0.0.0:8000")
    }

    /// Get train split (defaults to "data/lomn_train.jsonl")
    pub fn train_file(&self) -> PathBuf {
        self.train_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("data/lomn_train.jsonl"))
    }

    /// Get validation split (defaults to "data/lomn_val.jsonl")
    pub fn validation_file(&self) -> PathBuf {
        self.validation_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("data/lomn_val.jsonl"))
    }

    /// Get base model (defaults to "bert-base-uncased")
    pub fn base_model(&self) -> &str {
        self.base_model.as_deref().unwrap_or("bert-base-uncased")
    }

    /// Get checkpoint directory (defaults to "output")
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("output"))
    }

    /// Get final model directory (defaults to "output/lomn_classifier")
    pub fn model_dir(&self) -> PathBuf {
        self.model_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("output/lomn_classifier"))
    }

    /// Get logging directory (defaults to "logs")
    pub fn logging_dir(&self) -> PathBuf {
        self.logging_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("logs"))
    }

    /// Get trainer command (defaults to "lomn-trainer")
    pub fn command(&self) -> &str {
        self.command.as_deref().unwrap_or("lomn-trainer")
    }
}

/// Configuration loaded from .lomnrc.toml or ~/.config/lomn/config.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Index configuration
    #[serde(default)]
    pub index: IndexConfig,

    /// Embedding configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,

    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Generation configuration
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Training service configuration
    #[serde(default)]
    pub training: TrainingConfig,
}

impl Config {
    /// Load configuration from files
    ///
    /// Precedence (highest to lowest):
    /// 1. .lomnrc.toml in current directory
    /// 2. ~/.config/lomn/config.toml
    pub fn load() -> Self {
        if let Some(config) = Self::load_from_path(Path::new(".lomnrc.toml")) {
            return config;
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("lomn").join("config.toml");
            if let Some(config) = Self::load_from_path(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    /// Load a single config file; `None` when missing or unparsable.
    pub fn load_from_path(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Get the index configuration
    pub fn index(&self) -> &IndexConfig {
        &self.index
    }

    /// Get the embedding configuration
    pub fn embeddings(&self) -> &EmbeddingConfig {
        &self.embeddings
    }

    /// Get the retrieval configuration
    pub fn retrieval(&self) -> &RetrievalConfig {
        &self.retrieval
    }

    /// Get the generation configuration
    pub fn generation(&self) -> &GenerationConfig {
        &self.generation
    }

    /// Get the training configuration
    pub fn training(&self) -> &TrainingConfig {
        &self.training
    }
}
