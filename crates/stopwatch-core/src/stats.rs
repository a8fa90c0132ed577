// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Snapshot and per-day totals exposed to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::boundary::DayBoundary;

/// Point-in-time view of the stopwatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
	/// Closed time today plus the running session, in milliseconds
	#[serde(rename = "time")]
	pub elapsed_ms: i64,
	pub running: bool,
	/// `YYYY-MM-DD` of the tracked day
	#[serde(rename = "date")]
	pub day_label: String,
}

/// Total closed running time of one tracked day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayStat {
	pub day_start: DateTime<Utc>,
	pub elapsed_ms: i64,
}

impl DayStat {
	#[must_use]
	pub fn to_entry(&self, boundary: &DayBoundary) -> DayStatEntry {
		DayStatEntry {
			date: boundary.label(self.day_start),
			time: self.elapsed_ms,
		}
	}
}

/// Wire form of a [`DayStat`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStatEntry {
	pub date: String,
	pub time: i64,
}

/// Format milliseconds as `HH:MM:SS.mmm`. Hours are not wrapped at 24.
#[must_use]
pub fn format_elapsed(ms: i64) -> String {
	let ms = ms.max(0);
	let secs = ms / 1000;
	format!(
		"{:02}:{:02}:{:02}.{:03}",
		secs / 3600,
		(secs % 3600) / 60,
		secs % 60,
		ms % 1000
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::boundary::DayStartHour;
	use chrono::TimeZone;

	#[test]
	fn test_format_elapsed() {
		assert_eq!(format_elapsed(0), "00:00:00.000");
		assert_eq!(format_elapsed(5000), "00:00:05.000");
		assert_eq!(format_elapsed(3_723_045), "01:02:03.045");
		assert_eq!(format_elapsed(90_000_000), "25:00:00.000");
	}

	#[test]
	fn test_snapshot_wire_names() {
		let snapshot = Snapshot {
			elapsed_ms: 5000,
			running: false,
			day_label: "2026-03-10".to_string(),
		};
		let json = serde_json::to_value(&snapshot).unwrap();
		assert_eq!(json["time"], 5000);
		assert_eq!(json["running"], false);
		assert_eq!(json["date"], "2026-03-10");
	}

	#[test]
	fn test_day_stat_entry_uses_boundary_label() {
		let boundary = DayBoundary::utc(DayStartHour::new(8).unwrap());
		let stat = DayStat {
			day_start: Utc.with_ymd_and_hms(2026, 3, 9, 8, 0, 0).unwrap(),
			elapsed_ms: 42,
		};
		assert_eq!(
			stat.to_entry(&boundary),
			DayStatEntry {
				date: "2026-03-09".to_string(),
				time: 42
			}
		);
	}
}
