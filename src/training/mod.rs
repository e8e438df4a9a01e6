// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classifier fine-tuning service

pub mod dataset;
pub mod job;
pub mod service;

pub use dataset::{read_split, summarize, LabeledExample, SplitSummary, NUM_LABELS};
pub use job::{CommandTrainer, JobRegistry, JobState, Trainer, TrainingSpec};
pub use service::router;
