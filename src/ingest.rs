//! HTTP ingestion for IoT producers: vitals readings and motion events.

use anyhow::{Context, Result};
use axum::{extract::State, routing::get, routing::post, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::{
    motion::MotionTracker,
    vitals::{sampler::IngestedReading, IngestFeed},
};

#[derive(Clone)]
pub struct IngestState {
    pub feed: IngestFeed,
    pub tracker: MotionTracker,
}

#[derive(Debug, Serialize)]
pub struct Ack {
    pub status: &'static str,
}

pub fn router(state: IngestState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/iot/health", post(receive_health))
        .route("/iot/motion", post(receive_motion))
        .with_state(state)
}

async fn health() -> Json<Ack> {
    Json(Ack { status: "ok" })
}

async fn receive_health(
    State(state): State<IngestState>,
    Json(reading): Json<IngestedReading>,
) -> Json<Ack> {
    log::info!(
        "IoT data: HR={}, BP={}/{}, SpO2={:?}",
        reading.heart_rate,
        reading.bp_systolic,
        reading.bp_diastolic,
        reading.spo2
    );
    state.feed.publish(reading);
    Json(Ack { status: "received" })
}

async fn receive_motion(State(state): State<IngestState>) -> Json<Ack> {
    state.tracker.notify_movement();
    log::debug!("IoT motion event received");
    Json(Ack { status: "received" })
}

pub async fn bind(bind_addr: &str) -> Result<TcpListener> {
    TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind ingest server on {bind_addr}"))
}

/// Serves until `cancel_token` fires.
pub async fn serve(
    listener: TcpListener,
    state: IngestState,
    cancel_token: CancellationToken,
) -> Result<()> {
    log::info!("Ingest server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel_token.cancelled().await })
        .await
        .context("ingest server failed")
}
