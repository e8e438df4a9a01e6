// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fine-tuning job description, launcher and single-job registry

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::{Mutex, PoisonError};
use tracing::{error, info};

use super::dataset::{read_split, summarize, NUM_LABELS};
use crate::config::TrainingConfig;

/// Everything the external trainer needs, sent to it as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingSpec {
    pub train_file: PathBuf,
    pub validation_file: PathBuf,
    pub base_model: String,
    pub num_labels: u8,
    pub max_length: usize,
    pub num_train_epochs: u32,
    pub per_device_train_batch_size: u32,
    pub per_device_eval_batch_size: u32,
    pub eval_steps: u32,
    pub logging_steps: u32,
    pub save_steps: u32,
    pub metric_for_best_model: String,
    pub greater_is_better: bool,
    pub load_best_model_at_end: bool,
    pub output_dir: PathBuf,
    pub model_dir: PathBuf,
    pub logging_dir: PathBuf,
}

impl TrainingSpec {
    pub fn from_config(config: &TrainingConfig) -> Self {
        Self {
            train_file: config.train_file(),
            validation_file: config.validation_file(),
            base_model: config.base_model().to_string(),
            num_labels: NUM_LABELS,
            max_length: 512,
            num_train_epochs: 4,
            per_device_train_batch_size: 16,
            per_device_eval_batch_size: 16,
            eval_steps: 250,
            logging_steps: 100,
            save_steps: 250,
            metric_for_best_model: "accuracy".to_string(),
            greater_is_better: true,
            load_best_model_at_end: true,
            output_dir: config.output_dir(),
            model_dir: config.model_dir(),
            logging_dir: config.logging_dir(),
        }
    }
}

/// Runs one training job to completion (blocking).
pub trait Trainer: Send + Sync {
    fn train(&self, spec: &TrainingSpec) -> Result<()>;
}

/// Validates both splits, then hands the spec to an external trainer process.
pub struct CommandTrainer {
    command: String,
}

impl CommandTrainer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Trainer for CommandTrainer {
    fn train(&self, spec: &TrainingSpec) -> Result<()> {
        let train = summarize(&read_split(&spec.train_file)?);
        let validation = summarize(&read_split(&spec.validation_file)?);
        info!(?train, ?validation, base_model = %spec.base_model, "dataset splits validated");

        let payload = serde_json::to_string(spec)?;
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn trainer command: {}", self.command))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A trainer that exits without reading is reported through its status below.
            if let Err(err) = stdin.write_all(payload.as_bytes()) {
                if err.kind() != ErrorKind::BrokenPipe {
                    return Err(err).context("Failed to write training spec to stdin");
                }
            }
        }

        let output = child
            .wait_with_output()
            .context("Failed to wait for trainer command")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Trainer command failed (status {}): {}",
                output.status,
                stderr.trim()
            );
        }

        info!(model_dir = %spec.model_dir.display(), "training completed; model saved");
        Ok(())
    }
}

/// State of the most recent job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum JobState {
    Idle,
    Running { job_id: u64 },
    Succeeded { job_id: u64 },
    Failed { job_id: u64, error: String },
}

/// Tracks the current job and refuses to start a second concurrent one.
#[derive(Debug)]
pub struct JobRegistry {
    inner: Mutex<RegistryInner>,
}

#[derive(Debug)]
struct RegistryInner {
    next_id: u64,
    state: JobState,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                next_id: 1,
                state: JobState::Idle,
            }),
        }
    }
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the single job slot; `Err` carries the id of the running job.
    pub fn try_start(&self) -> std::result::Result<u64, u64> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let JobState::Running { job_id } = inner.state {
            return Err(job_id);
        }
        let job_id = inner.next_id;
        inner.next_id += 1;
        inner.state = JobState::Running { job_id };
        Ok(job_id)
    }

    /// Records the outcome of `job_id` and frees the slot.
    pub fn finish(&self, job_id: u64, outcome: &Result<()>) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.state = match outcome {
            Ok(()) => JobState::Succeeded { job_id },
            Err(err) => {
                error!(job_id, "training job failed: {:#}", err);
                JobState::Failed {
                    job_id,
                    error: format!("{:#}", err),
                }
            }
        };
    }

    pub fn state(&self) -> JobState {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn spec_in(dir: &std::path::Path) -> TrainingSpec {
        let config: TrainingConfig = toml::from_str(&format!(
            "train_file = {:?}\nvalidation_file = {:?}\noutput_dir = {:?}",
            dir.join("train.jsonl"),
            dir.join("val.jsonl"),
            dir.join("out"),
        ))
        .unwrap();
        TrainingSpec::from_config(&config)
    }

    fn write_splits(dir: &std::path::Path) {
        std::fs::write(dir.join("train.jsonl"), "{\"text\": \"a\", \"label\": 1}\n").unwrap();
        std::fs::write(dir.join("val.jsonl"), "{\"text\": \"b\", \"label\": 0}\n").unwrap();
    }

    #[test]
    fn spec_defaults_follow_classifier_recipe() {
        let spec = TrainingSpec::from_config(&TrainingConfig::default());
        assert_eq!(spec.base_model, "bert-base-uncased");
        assert_eq!(spec.num_labels, 2);
        assert_eq!(spec.max_length, 512);
        assert_eq!(spec.num_train_epochs, 4);
        assert_eq!(spec.eval_steps, 250);
        assert_eq!(spec.metric_for_best_model, "accuracy");
        assert_eq!(spec.model_dir, PathBuf::from("output/lomn_classifier"));
    }

    #[test]
    fn registry_allows_one_job_at_a_time() {
        let registry = JobRegistry::new();
        assert_eq!(registry.state(), JobState::Idle);

        let first = registry.try_start().unwrap();
        assert_eq!(registry.try_start(), Err(first));

        registry.finish(first, &Ok(()));
        assert_eq!(registry.state(), JobState::Succeeded { job_id: first });

        let second = registry.try_start().unwrap();
        assert_eq!(second, first + 1);
        registry.finish(second, &Err(anyhow::anyhow!("out of memory")));
        assert!(matches!(
            registry.state(),
            JobState::Failed { job_id, ref error } if job_id == second && error.contains("out of memory")
        ));
    }

    #[test]
    fn command_trainer_receives_spec_on_stdin() {
        let dir = tempdir().unwrap();
        write_splits(dir.path());
        let spec = spec_in(dir.path());
        let captured = dir.path().join("spec.json");

        let trainer = CommandTrainer::new(format!("cat > {:?}", captured));
        trainer.train(&spec).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&captured).unwrap()).unwrap();
        assert_eq!(raw["base_model"], "bert-base-uncased");
        assert_eq!(raw["num_labels"], 2);
    }

    #[test]
    fn command_trainer_reports_failure() {
        let dir = tempdir().unwrap();
        write_splits(dir.path());
        let trainer = CommandTrainer::new("echo cuda unavailable >&2; exit 3");
        let err = trainer.train(&spec_in(dir.path())).unwrap_err();
        assert!(err.to_string().contains("cuda unavailable"));
    }

    #[test]
    fn command_trainer_that_skips_stdin_reports_status() {
        let dir = tempdir().unwrap();
        write_splits(dir.path());
        let trainer = CommandTrainer::new("echo 'no GPU visible' >&2; exit 4");
        let err = trainer.train(&spec_in(dir.path())).unwrap_err().to_string();
        assert!(err.contains("Trainer command failed"));
        assert!(err.contains("no GPU visible"));
    }

    #[test]
    fn command_trainer_validates_splits_first() {
        let dir = tempdir().unwrap();
        let marker = dir.path().join("ran");
        let trainer = CommandTrainer::new(format!("touch {:?}", marker));
        assert!(trainer.train(&spec_in(dir.path())).is_err());
        assert!(!marker.exists());
    }
}
