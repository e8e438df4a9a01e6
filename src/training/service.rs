// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface of the fine-tuning service.
//!
//! `POST /train` starts a background job and answers immediately;
//! `GET /train/status` reports the most recent job.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::task;
use tracing::{info, warn};

use super::job::{JobRegistry, JobState, Trainer, TrainingSpec};

pub const STARTED_MESSAGE: &str = "LOMN model training started";
pub const BUSY_MESSAGE: &str = "training already in progress";

#[derive(Clone)]
struct AppState {
    trainer: Arc<dyn Trainer>,
    spec: Arc<TrainingSpec>,
    jobs: Arc<JobRegistry>,
}

#[derive(Debug, Serialize)]
struct TrainResponse {
    status: &'static str,
    job_id: u64,
}

/// Builds the service router around `trainer`.
pub fn router(trainer: Arc<dyn Trainer>, spec: TrainingSpec) -> Router {
    let state = AppState {
        trainer,
        spec: Arc::new(spec),
        jobs: Arc::new(JobRegistry::new()),
    };
    Router::new()
        .route("/train", post(handle_train))
        .route("/train/status", get(handle_status))
        .with_state(state)
}

async fn handle_train(State(state): State<AppState>) -> (StatusCode, Json<TrainResponse>) {
    let job_id = match state.jobs.try_start() {
        Ok(job_id) => job_id,
        Err(running) => {
            warn!(running, "rejecting training request");
            return (
                StatusCode::CONFLICT,
                Json(TrainResponse {
                    status: BUSY_MESSAGE,
                    job_id: running,
                }),
            );
        }
    };

    info!(job_id, base_model = %state.spec.base_model, "training job started");
    let AppState { trainer, spec, jobs } = state;
    task::spawn(async move {
        let outcome = match task::spawn_blocking(move || trainer.train(&spec)).await {
            Ok(outcome) => outcome,
            Err(join) => Err(anyhow::anyhow!("training task panicked: {}", join)),
        };
        jobs.finish(job_id, &outcome);
        if outcome.is_ok() {
            info!(job_id, "training job finished");
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(TrainResponse {
            status: STARTED_MESSAGE,
            job_id,
        }),
    )
}

async fn handle_status(State(state): State<AppState>) -> Json<JobState> {
    Json(state.jobs.state())
}
