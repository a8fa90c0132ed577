// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Day boundary arithmetic.
//!
//! A tracked day runs from `hour:00` local time to the next `hour:00`. Local
//! time is a fixed UTC offset, so every day is exactly 24 hours long and the
//! boundaries are deterministic regardless of DST rules on the host.

use chrono::{
	DateTime, Duration, FixedOffset, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike, Utc,
};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Hour of the day (0-23) at which a tracked day begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DayStartHour(u8);

impl DayStartHour {
	pub fn new(hour: u32) -> Result<Self> {
		if hour > 23 {
			return Err(CoreError::InvalidDayStartHour(hour));
		}
		Ok(Self(hour as u8))
	}

	#[must_use]
	pub fn get(self) -> u32 {
		u32::from(self.0)
	}
}

impl Default for DayStartHour {
	fn default() -> Self {
		Self(8)
	}
}

impl TryFrom<u32> for DayStartHour {
	type Error = CoreError;

	fn try_from(hour: u32) -> Result<Self> {
		Self::new(hour)
	}
}

impl From<DayStartHour> for u32 {
	fn from(hour: DayStartHour) -> Self {
		hour.get()
	}
}

impl std::fmt::Display for DayStartHour {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:02}:00", self.0)
	}
}

/// Day boundary calculator for a day-start hour in a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBoundary {
	start_hour: DayStartHour,
	offset: FixedOffset,
}

impl DayBoundary {
	#[must_use]
	pub fn new(start_hour: DayStartHour, offset: FixedOffset) -> Self {
		Self { start_hour, offset }
	}

	/// Boundary calculator with days measured in UTC.
	#[must_use]
	pub fn utc(start_hour: DayStartHour) -> Self {
		Self::new(start_hour, Utc.fix())
	}

	#[must_use]
	pub fn start_hour(&self) -> DayStartHour {
		self.start_hour
	}

	#[must_use]
	pub fn offset(&self) -> FixedOffset {
		self.offset
	}

	fn offset_delta(&self) -> Duration {
		Duration::seconds(i64::from(self.offset.local_minus_utc()))
	}

	fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
		instant.naive_utc() + self.offset_delta()
	}

	/// Start of the tracked day containing `instant`.
	///
	/// If the local time of day precedes `hour:00` the instant belongs to the
	/// previous day, so 24 hours are subtracted before truncating to `hour:00`.
	#[must_use]
	pub fn day_start(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
		let mut local = self.to_local(instant);
		if local.hour() < self.start_hour.get() {
			local -= Duration::hours(24);
		}

		let start_local = local.date().and_time(NaiveTime::default())
			+ Duration::hours(i64::from(self.start_hour.get()));

		Utc.from_utc_datetime(&(start_local - self.offset_delta()))
	}

	/// Start of the tracked day following the one containing `instant`.
	#[must_use]
	pub fn day_end(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
		self.day_start(instant + Duration::hours(24))
	}

	/// `YYYY-MM-DD` label of the tracked day containing `instant`.
	#[must_use]
	pub fn label(&self, instant: DateTime<Utc>) -> String {
		self
			.day_start(instant)
			.with_timezone(&self.offset)
			.format("%Y-%m-%d")
			.to_string()
	}

	/// Start of the tracked day labelled with the given local calendar date.
	#[must_use]
	pub fn day_of_date(&self, date: chrono::NaiveDate) -> DateTime<Utc> {
		let start_local =
			date.and_time(NaiveTime::default()) + Duration::hours(i64::from(self.start_hour.get()));
		Utc.from_utc_datetime(&(start_local - self.offset_delta()))
	}
}

/// Parse a UTC offset written as `+HH:MM`, `-HH:MM` or `Z`.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset> {
	let trimmed = s.trim();
	if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
		return Ok(Utc.fix());
	}

	let invalid = || CoreError::InvalidUtcOffset(s.to_string());

	let (sign, rest) = match trimmed.as_bytes().first() {
		Some(b'+') => (1, &trimmed[1..]),
		Some(b'-') => (-1, &trimmed[1..]),
		_ => return Err(invalid()),
	};

	let (hours, minutes) = match rest.split_once(':') {
		Some((h, m)) => (h, m),
		None if rest.len() == 4 => rest.split_at(2),
		None => return Err(invalid()),
	};

	if hours.len() != 2 || minutes.len() != 2 {
		return Err(invalid());
	}

	let hours: i32 = hours.parse().map_err(|_| invalid())?;
	let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
	if hours > 23 || minutes > 59 {
		return Err(invalid());
	}

	FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
