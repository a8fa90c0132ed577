// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for session persistence.

use thiserror::Error;

/// Errors that can occur in the session store.
#[derive(Debug, Error)]
pub enum StoreError {
	/// Database error
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),

	/// No open session starting at the given instant
	#[error("no open session starting at {0}")]
	NotFound(i64),

	/// Invalid database URL or pool settings
	#[error("invalid database configuration: {0}")]
	InvalidConfig(String),

	/// Stored row does not form a valid session
	#[error("invalid session data: {0}")]
	InvalidData(String),

	/// Core error
	#[error("stopwatch core error: {0}")]
	Core(#[from] stopwatch_core::CoreError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
