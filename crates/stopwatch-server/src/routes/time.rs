// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Current-state endpoints: read, start and stop.
//!
//! All three answer with the same snapshot body:
//! `{"time": ms, "running": bool, "date": "YYYY-MM-DD"}`.

use axum::{extract::State, Json};
use tracing::instrument;

use stopwatch_core::Snapshot;

use crate::api::AppState;
use crate::error::ServerError;

/// GET /time
pub async fn get_time(State(state): State<AppState>) -> Json<Snapshot> {
	Json(state.stopwatch.snapshot().await)
}

/// GET /start
#[instrument(skip(state))]
pub async fn start(State(state): State<AppState>) -> Result<Json<Snapshot>, ServerError> {
	Ok(Json(state.stopwatch.start().await?))
}

/// GET /stop
#[instrument(skip(state))]
pub async fn stop(State(state): State<AppState>) -> Result<Json<Snapshot>, ServerError> {
	Ok(Json(state.stopwatch.stop().await?))
}
