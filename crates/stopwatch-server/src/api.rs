// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP router for the stopwatch.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::routes;
use crate::state::StopwatchState;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub stopwatch: Arc<StopwatchState>,
}

impl AppState {
	pub fn new(stopwatch: Arc<StopwatchState>) -> Self {
		Self { stopwatch }
	}
}

/// Build the router with every route mounted under `href_prefix`.
///
/// `href_prefix` is either empty or starts with `/` and has no trailing `/`.
pub fn create_router(state: AppState, href_prefix: &str) -> Router {
	let routes = Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/time", get(routes::time::get_time))
		.route("/start", get(routes::time::start))
		.route("/stop", get(routes::time::stop))
		.route("/sessions", get(routes::sessions::list_sessions))
		.route("/stat", get(routes::stats::last_week))
		.route("/stats/{date}", get(routes::stats::day))
		.route("/updates", get(routes::updates::ws_upgrade_handler))
		.with_state(state);

	if href_prefix.is_empty() {
		routes
	} else {
		Router::new().nest(href_prefix, routes)
	}
}
