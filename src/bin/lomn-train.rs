// SPDX-License-Identifier: MIT OR Apache-2.0

//! lomn-train - HTTP trigger for the LOMN classifier fine-tuning job
//!
//! `POST /train` starts a background job, `GET /train/status` reports it.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use lomn::config::Config;
use lomn::training::{router, CommandTrainer, TrainingSpec};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LOMN_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();
    let training = config.training();
    let spec = TrainingSpec::from_config(training);
    let trainer = Arc::new(CommandTrainer::new(training.command()));
    let app = router(trainer, spec);

    let addr: SocketAddr = training
        .bind()
        .parse()
        .with_context(|| format!("Invalid bind address: {}", training.bind()))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, trainer = training.command(), "training service listening");
    axum::serve(listener, app).await?;
    Ok(())
}
