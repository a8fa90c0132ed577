// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP client used by the `start`, `stop` and `status` subcommands.

use std::time::Duration;

use tracing::instrument;

use stopwatch_core::{format_elapsed, Snapshot};

use crate::error::ClientError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote action against a running server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAction {
	Start,
	Stop,
	Status,
}

impl ClientAction {
	fn path(self) -> &'static str {
		match self {
			ClientAction::Start => "/start",
			ClientAction::Stop => "/stop",
			ClientAction::Status => "/time",
		}
	}
}

pub struct StopwatchClient {
	http: reqwest::Client,
	base_url: String,
}

impl StopwatchClient {
	/// `base_url` includes the route prefix, e.g. `http://localhost:8080/stopwatch`.
	pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
		let base_url = base_url.into();
		let http = reqwest::Client::builder()
			.timeout(REQUEST_TIMEOUT)
			.build()
			.map_err(|source| ClientError::Request {
				url: base_url.clone(),
				source,
			})?;
		Ok(Self { http, base_url })
	}

	#[instrument(skip(self), fields(base_url = %self.base_url))]
	pub async fn call(&self, action: ClientAction) -> Result<Snapshot, ClientError> {
		let url = format!("{}{}", self.base_url.trim_end_matches('/'), action.path());
		let response = self
			.http
			.get(&url)
			.send()
			.await
			.map_err(|source| ClientError::Request {
				url: url.clone(),
				source,
			})?;

		let status = response.status();
		if !status.is_success() {
			return Err(ClientError::Status { url, status });
		}

		response
			.json::<Snapshot>()
			.await
			.map_err(|source| ClientError::Request { url, source })
	}
}

/// `Running. duration: HH:MM:SS.mmm` or `Stopped. duration: ...`.
pub fn render_status(snapshot: &Snapshot) -> String {
	let state = if snapshot.running { "Running" } else { "Stopped" };
	format!("{state}. duration: {}", format_elapsed(snapshot.elapsed_ms))
}
