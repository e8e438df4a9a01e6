// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sample letter loading
//!
//! A corpus is a flat directory of JSON files, one letter per file. Missing
//! metadata never rejects a letter; unreadable files are skipped with a warning.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Per-letter metadata stored for every chunk of that letter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMetadata {
    pub id: String,
    pub category: String,
    pub diagnosis: String,
    pub payer: String,
}

/// One sample Letter of Medical Necessity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub metadata: DocumentMetadata,
    pub body: String,
    pub path: PathBuf,
}

impl SourceDocument {
    /// Builds a document from a parsed JSON object, defaulting absent fields to "".
    pub fn from_json(object: &Map<String, Value>, path: impl Into<PathBuf>) -> Self {
        Self {
            metadata: DocumentMetadata {
                id: field(object, "id"),
                category: field(object, "category"),
                diagnosis: field(object, "diagnosis"),
                payer: field(object, "payer"),
            },
            body: field(object, "body"),
            path: path.into(),
        }
    }
}

fn field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Loads every `*.json` file directly inside `dir`, in file-name order.
///
/// A missing directory yields an empty corpus.
pub fn load_documents(dir: impl AsRef<Path>) -> Vec<SourceDocument> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        warn!("Document directory {} does not exist", dir.display());
        return Vec::new();
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_json(path) {
            continue;
        }
        if let Some(doc) = read_document(path) {
            documents.push(doc);
        }
    }

    debug!(count = documents.len(), dir = %dir.display(), "loaded documents");
    documents
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn read_document(path: &Path) -> Option<SourceDocument> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!("Failed to read {}: {}", path.display(), err);
            return None;
        }
    };
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(object)) => Some(SourceDocument::from_json(&object, path)),
        Ok(_) => {
            warn!("Skipping {}: top-level JSON value is not an object", path.display());
            None
        }
        Err(err) => {
            warn!("Skipping {}: invalid JSON: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn loads_json_files_in_name_order() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("b.json"),
            r#"{"id": "b", "category": "mh", "diagnosis": "MDD", "payer": "Aetna", "body": "second"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("a.json"), r#"{"id": "a", "body": "first"}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a letter").unwrap();

        let docs = load_documents(dir.path());
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].metadata.id, "a");
        assert_eq!(docs[0].body, "first");
        assert_eq!(docs[1].metadata.payer, "Aetna");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x.json"), r#"{"diagnosis": null, "id": 7}"#).unwrap();

        let docs = load_documents(dir.path());
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].metadata.id, "7");
        assert_eq!(docs[0].metadata.category, "");
        assert_eq!(docs[0].metadata.diagnosis, "");
        assert_eq!(docs[0].body, "");
    }

    #[test]
    fn malformed_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        fs::write(dir.path().join("list.json"), "[1, 2, 3]").unwrap();
        fs::write(dir.path().join("ok.json"), r#"{"body": "text"}"#).unwrap();

        let docs = load_documents(dir.path());
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].body, "text");
    }

    #[test]
    fn nested_directories_are_not_scanned() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("n.json"), r#"{"body": "x"}"#).unwrap();

        assert!(load_documents(dir.path()).is_empty());
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_documents(dir.path().join("absent")).is_empty());
    }
}
