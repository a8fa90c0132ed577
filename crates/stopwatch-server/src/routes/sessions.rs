// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session listing.

use axum::{
	extract::{Query, State},
	Json,
};
use serde::Deserialize;
use tracing::instrument;

use stopwatch_core::{from_millis, SessionSpan};

use crate::api::AppState;
use crate::error::ServerError;

#[derive(Debug, Deserialize)]
pub struct SessionsQuery {
	/// Any instant (ms) inside the day to list; today when absent.
	pub time: Option<i64>,
}

/// GET /sessions[?time=ms]
#[instrument(skip(state))]
pub async fn list_sessions(
	State(state): State<AppState>,
	Query(query): Query<SessionsQuery>,
) -> Result<Json<Vec<SessionSpan>>, ServerError> {
	let spans = match query.time {
		None => state.stopwatch.sessions_today().await,
		Some(ms) => {
			let instant = from_millis(ms).map_err(|e| ServerError::BadRequest(e.to_string()))?;
			state.stopwatch.sessions_for_day(instant).await?
		}
	};
	Ok(Json(spans))
}
