// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session types: one contiguous interval during which the stopwatch ran.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Milliseconds since the Unix epoch, the precision sessions are stored at.
#[must_use]
pub fn to_millis(instant: DateTime<Utc>) -> i64 {
	instant.timestamp_millis()
}

pub fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
	DateTime::from_timestamp_millis(ms).ok_or(CoreError::TimestampOutOfRange(ms))
}

fn truncate_to_millis(instant: DateTime<Utc>) -> DateTime<Utc> {
	DateTime::from_timestamp_millis(instant.timestamp_millis()).unwrap_or(instant)
}

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
	/// Stopwatch is running; no end yet
	Open,
	/// Session has an end instant
	Closed,
}

/// A single running interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
	pub start: DateTime<Utc>,
	pub end: Option<DateTime<Utc>>,
}

impl Session {
	/// Open a session at `start`, truncated to millisecond precision.
	#[must_use]
	pub fn open_at(start: DateTime<Utc>) -> Self {
		Self {
			start: truncate_to_millis(start),
			end: None,
		}
	}

	/// Rebuild a session from its stored millisecond form.
	pub fn from_millis(start_ms: i64, end_ms: Option<i64>) -> Result<Self> {
		let start = from_millis(start_ms)?;
		let end = end_ms.map(from_millis).transpose()?;
		if let Some(end_ms) = end_ms {
			if end_ms < start_ms {
				return Err(CoreError::EndBeforeStart { start_ms, end_ms });
			}
		}
		Ok(Self { start, end })
	}

	#[must_use]
	pub fn state(&self) -> SessionState {
		if self.end.is_some() {
			SessionState::Closed
		} else {
			SessionState::Open
		}
	}

	#[must_use]
	pub fn is_open(&self) -> bool {
		self.end.is_none()
	}

	#[must_use]
	pub fn start_ms(&self) -> i64 {
		to_millis(self.start)
	}

	#[must_use]
	pub fn end_ms(&self) -> Option<i64> {
		self.end.map(to_millis)
	}

	/// Closed copy of this session ending at `end`.
	pub fn close_at(&self, end: DateTime<Utc>) -> Result<Self> {
		if self.end.is_some() {
			return Err(CoreError::AlreadyClosed);
		}
		let end = truncate_to_millis(end);
		if end < self.start {
			return Err(CoreError::EndBeforeStart {
				start_ms: self.start_ms(),
				end_ms: to_millis(end),
			});
		}
		Ok(Self {
			start: self.start,
			end: Some(end),
		})
	}

	/// Split an open session at `boundary` into a closed head `[start, boundary]`
	/// and an open tail starting exactly at `boundary`.
	pub fn split_at(&self, boundary: DateTime<Utc>) -> Result<(Self, Self)> {
		let head = self.close_at(boundary)?;
		let tail = Self::open_at(boundary);
		Ok((head, tail))
	}

	/// Duration in milliseconds. Zero for open sessions.
	#[must_use]
	pub fn duration_ms(&self) -> i64 {
		match self.end {
			Some(end) => to_millis(end) - self.start_ms(),
			None => 0,
		}
	}

	/// Time run so far, for an open session measured up to `now`.
	#[must_use]
	pub fn running_ms(&self, now: DateTime<Utc>) -> i64 {
		match self.end {
			Some(_) => self.duration_ms(),
			None => (to_millis(now) - self.start_ms()).max(0),
		}
	}

	#[must_use]
	pub fn to_span(&self) -> SessionSpan {
		SessionSpan {
			start: self.start_ms(),
			end: self.end_ms().unwrap_or(0),
		}
	}
}

/// Wire form of a session. Open sessions carry `end = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSpan {
	pub start: i64,
	pub end: i64,
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{Duration, TimeZone};

	fn t0() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
	}

	#[test]
	fn test_open_session_truncates_to_millis() {
		let start = t0() + Duration::nanoseconds(1_234_567);
		let session = Session::open_at(start);
		assert_eq!(session.start, t0() + Duration::milliseconds(1));
		assert_eq!(session.state(), SessionState::Open);
		assert_eq!(session.duration_ms(), 0);
	}

	#[test]
	fn test_close_records_duration() {
		let session = Session::open_at(t0());
		let closed = session.close_at(t0() + Duration::milliseconds(5000)).unwrap();
		assert_eq!(closed.state(), SessionState::Closed);
		assert_eq!(closed.duration_ms(), 5000);
		assert_eq!(
			closed.to_span(),
			SessionSpan {
				start: to_millis(t0()),
				end: to_millis(t0()) + 5000
			}
		);
	}

	#[test]
	fn test_close_before_start_rejected() {
		let session = Session::open_at(t0());
		let err = session.close_at(t0() - Duration::seconds(1)).unwrap_err();
		assert!(matches!(err, CoreError::EndBeforeStart { .. }));
	}

	#[test]
	fn test_close_twice_rejected() {
		let closed = Session::open_at(t0()).close_at(t0()).unwrap();
		assert_eq!(closed.close_at(t0()), Err(CoreError::AlreadyClosed));
	}

	#[test]
	fn test_split_covers_interval_without_gap() {
		let session = Session::open_at(t0());
		let boundary = t0() + Duration::hours(3);
		let (head, tail) = session.split_at(boundary).unwrap();

		assert_eq!(head.start, t0());
		assert_eq!(head.end, Some(boundary));
		assert_eq!(tail.start, boundary);
		assert!(tail.is_open());

		let now = boundary + Duration::minutes(10);
		assert_eq!(
			head.duration_ms() + tail.running_ms(now),
			session.running_ms(now)
		);
	}

	#[test]
	fn test_open_span_has_zero_end() {
		let span = Session::open_at(t0()).to_span();
		assert_eq!(span.end, 0);
		let json = serde_json::to_string(&span).unwrap();
		assert_eq!(json, format!(r#"{{"start":{},"end":0}}"#, to_millis(t0())));
	}

	#[test]
	fn test_from_millis_validates_order() {
		assert!(Session::from_millis(2000, Some(1000)).is_err());
		let s = Session::from_millis(1000, None).unwrap();
		assert!(s.is_open());
		assert_eq!(s.start_ms(), 1000);
	}

	#[test]
	fn test_running_ms_never_negative() {
		let session = Session::open_at(t0());
		assert_eq!(session.running_ms(t0() - Duration::seconds(5)), 0);
	}
}
