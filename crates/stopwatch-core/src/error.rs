// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the stopwatch core.

use thiserror::Error;

/// Errors raised by core value construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
	/// Day start hour outside 0..=23
	#[error("invalid day start hour: {0} (expected 0-23)")]
	InvalidDayStartHour(u32),

	/// Unparseable or out-of-range UTC offset
	#[error("invalid UTC offset: {0}")]
	InvalidUtcOffset(String),

	/// Millisecond timestamp outside the representable range
	#[error("timestamp out of range: {0}")]
	TimestampOutOfRange(i64),

	/// Session would end before it started
	#[error("session ends before it starts: start={start_ms} end={end_ms}")]
	EndBeforeStart { start_ms: i64, end_ms: i64 },

	/// Operation requires an open session
	#[error("session is already closed")]
	AlreadyClosed,
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
