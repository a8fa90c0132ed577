// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-day history.

use axum::{
	extract::{Path, State},
	Json,
};
use chrono::{Duration, NaiveDate};
use tracing::instrument;

use stopwatch_core::DayStatEntry;

use crate::api::AppState;
use crate::error::ServerError;

const HISTORY_DAYS: i64 = 7;

/// GET /stat - the last seven tracked days, oldest first, today included.
#[instrument(skip(state))]
pub async fn last_week(State(state): State<AppState>) -> Result<Json<Vec<DayStatEntry>>, ServerError> {
	let stopwatch = &state.stopwatch;
	let boundary = stopwatch.boundary();
	let now = stopwatch.now();

	let from = now - Duration::days(HISTORY_DAYS - 1);
	let stats = stopwatch.day_stats(from, boundary.day_end(now)).await?;
	Ok(Json(stats.iter().map(|s| s.to_entry(boundary)).collect()))
}

/// GET /stats/{date} - one tracked day by its `YYYY-MM-DD` label.
#[instrument(skip(state))]
pub async fn day(
	State(state): State<AppState>,
	Path(date): Path<String>,
) -> Result<Json<DayStatEntry>, ServerError> {
	let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
		.map_err(|_| ServerError::NotFound(format!("no such day: {date}")))?;

	let stopwatch = &state.stopwatch;
	let boundary = stopwatch.boundary();
	let day_start = boundary.day_of_date(date);

	let stats = stopwatch
		.day_stats(day_start, day_start + Duration::hours(24))
		.await?;
	let stat = stats
		.first()
		.ok_or_else(|| ServerError::NotFound(format!("no such day: {date}")))?;
	Ok(Json(stat.to_entry(boundary)))
}
