// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the stopwatch server.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::Serialize;
use thiserror::Error;

use stopwatch_core::CoreError;
use stopwatch_server_db::StoreError;

/// Errors raised by stopwatch state operations.
#[derive(Debug, Error)]
pub enum StopwatchError {
	/// Persistence failed; in-memory state was left unchanged
	#[error("store error: {0}")]
	Store(#[from] StoreError),

	/// Session invariant violated
	#[error("session error: {0}")]
	Core(#[from] CoreError),
}

/// Result type for stopwatch state operations.
pub type Result<T> = std::result::Result<T, StopwatchError>;

/// Errors talking to the update broadcaster.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BroadcastError {
	/// The coordinator task has stopped
	#[error("update broadcaster is not running")]
	Closed,
}

/// Errors returned by the CLI client.
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("request to {url} failed: {source}")]
	Request {
		url: String,
		#[source]
		source: reqwest::Error,
	},

	#[error("server at {url} returned {status}")]
	Status { url: String, status: StatusCode },
}

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServeError {
	#[error("database setup failed: {0}")]
	Store(#[from] StoreError),

	#[error("failed to load stopwatch state: {0}")]
	Stopwatch(#[from] StopwatchError),

	#[error("listener error: {0}")]
	Io(#[from] std::io::Error),
}

/// Error body returned by every failing HTTP handler.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

/// HTTP-facing error.
#[derive(Debug, Error)]
pub enum ServerError {
	#[error("not found: {0}")]
	NotFound(String),

	#[error("bad request: {0}")]
	BadRequest(String),

	#[error(transparent)]
	Stopwatch(#[from] StopwatchError),

	#[error(transparent)]
	Broadcast(#[from] BroadcastError),
}

impl ServerError {
	fn status(&self) -> StatusCode {
		match self {
			ServerError::NotFound(_) => StatusCode::NOT_FOUND,
			ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
			ServerError::Broadcast(_) => StatusCode::SERVICE_UNAVAILABLE,
			ServerError::Stopwatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn code(&self) -> &'static str {
		match self {
			ServerError::NotFound(_) => "not_found",
			ServerError::BadRequest(_) => "bad_request",
			ServerError::Broadcast(_) => "unavailable",
			ServerError::Stopwatch(_) => "internal_error",
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let status = self.status();
		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		}
		let body = ErrorResponse {
			error: self.code().to_string(),
			message: self.to_string(),
		};
		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_mapping() {
		assert_eq!(
			ServerError::NotFound("2026-13-01".into()).status(),
			StatusCode::NOT_FOUND
		);
		assert_eq!(
			ServerError::from(StopwatchError::Core(CoreError::AlreadyClosed)).status(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
		assert_eq!(
			ServerError::from(BroadcastError::Closed).status(),
			StatusCode::SERVICE_UNAVAILABLE
		);
	}

	#[test]
	fn test_into_response_sets_status() {
		let response = ServerError::BadRequest("time".into()).into_response();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	}
}
