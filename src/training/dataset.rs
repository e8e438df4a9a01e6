// SPDX-License-Identifier: MIT OR Apache-2.0

//! Labeled letter splits for the classifier fine-tuning job.
//!
//! Each split is JSONL, one `{"text": ..., "label": 0|1}` object per line,
//! where 0 marks a denial and 1 a medical-necessity letter.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Number of classifier labels (denial, medical necessity).
pub const NUM_LABELS: u8 = 2;

/// One training example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub text: String,
    pub label: u8,
}

/// Counts per label for a split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SplitSummary {
    pub examples: usize,
    pub denials: usize,
    pub necessity: usize,
}

/// Reads and validates a JSONL split. Blank lines are ignored.
pub fn read_split(path: &Path) -> Result<Vec<LabeledExample>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open dataset split: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut examples = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let example: LabeledExample = serde_json::from_str(&line).with_context(|| {
            format!("{}:{}: expected {{\"text\", \"label\"}}", path.display(), line_no + 1)
        })?;
        if example.label >= NUM_LABELS {
            bail!(
                "{}:{}: label {} out of range (expected 0 or 1)",
                path.display(),
                line_no + 1,
                example.label
            );
        }
        examples.push(example);
    }

    if examples.is_empty() {
        bail!("Dataset split {} has no examples", path.display());
    }
    Ok(examples)
}

/// Summarizes label balance for logging.
pub fn summarize(examples: &[LabeledExample]) -> SplitSummary {
    let denials = examples.iter().filter(|e| e.label == 0).count();
    SplitSummary {
        examples: examples.len(),
        denials,
        necessity: examples.len() - denials,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_valid_split() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("train.jsonl");
        std::fs::write(
            &path,
            "{\"text\": \"letter one\", \"label\": 1}\n\n{\"text\": \"denied\", \"label\": 0}\n",
        )
        .unwrap();

        let examples = read_split(&path).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(
            summarize(&examples),
            SplitSummary {
                examples: 2,
                denials: 1,
                necessity: 1
            }
        );
    }

    #[test]
    fn rejects_out_of_range_label() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("val.jsonl");
        std::fs::write(&path, "{\"text\": \"x\", \"label\": 3}\n").unwrap();
        let err = read_split(&path).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn rejects_missing_fields_with_line_number() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("val.jsonl");
        std::fs::write(&path, "{\"text\": \"ok\", \"label\": 1}\n{\"text\": \"no label\"}\n").unwrap();
        let err = read_split(&path).unwrap_err();
        assert!(err.to_string().contains("val.jsonl:2"));
    }

    #[test]
    fn rejects_empty_and_missing_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.jsonl");
        std::fs::write(&path, "\n").unwrap();
        assert!(read_split(&path).is_err());
        assert!(read_split(&dir.path().join("absent.jsonl")).is_err());
    }
}
