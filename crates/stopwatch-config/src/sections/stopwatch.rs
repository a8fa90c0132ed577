// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stopwatch section: day boundaries and the day-split worker.

use std::time::Duration;

use chrono::{FixedOffset, Local, Offset};
use serde::{Deserialize, Serialize};
use stopwatch_core::{parse_utc_offset, DayBoundary, DayStartHour};

use crate::error::ConfigError;

const DEFAULT_DAY_START_HOUR: u32 = 8;
const DEFAULT_SPLIT_POLL_INTERVAL_SECS: u64 = 60;
const SECS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopwatchConfig {
	pub day_start_hour: DayStartHour,
	/// Fixed offset used for all local-time arithmetic.
	pub utc_offset: FixedOffset,
	pub split_poll_interval_secs: u64,
}

impl StopwatchConfig {
	pub fn boundary(&self) -> DayBoundary {
		DayBoundary::new(self.day_start_hour, self.utc_offset)
	}

	pub fn split_poll_interval(&self) -> Duration {
		Duration::from_secs(self.split_poll_interval_secs)
	}
}

impl Default for StopwatchConfig {
	fn default() -> Self {
		Self {
			day_start_hour: DayStartHour::default(),
			utc_offset: host_offset(),
			split_poll_interval_secs: DEFAULT_SPLIT_POLL_INTERVAL_SECS,
		}
	}
}

fn host_offset() -> FixedOffset {
	Local::now().offset().fix()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StopwatchConfigLayer {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub day_start_hour: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub utc_offset: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub split_poll_interval_secs: Option<u64>,
}

impl StopwatchConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.day_start_hour.is_some() {
			self.day_start_hour = other.day_start_hour;
		}
		if other.utc_offset.is_some() {
			self.utc_offset = other.utc_offset;
		}
		if other.split_poll_interval_secs.is_some() {
			self.split_poll_interval_secs = other.split_poll_interval_secs;
		}
	}

	pub fn finalize(self) -> Result<StopwatchConfig, ConfigError> {
		let day_start_hour = DayStartHour::new(self.day_start_hour.unwrap_or(DEFAULT_DAY_START_HOUR))
			.map_err(|e| ConfigError::Validation(e.to_string()))?;

		let utc_offset = match self.utc_offset.as_deref() {
			Some(raw) => parse_utc_offset(raw).map_err(|e| ConfigError::InvalidValue {
				key: "stopwatch.utc_offset".to_string(),
				message: e.to_string(),
			})?,
			None => host_offset(),
		};

		let split_poll_interval_secs = self
			.split_poll_interval_secs
			.unwrap_or(DEFAULT_SPLIT_POLL_INTERVAL_SECS);
		if split_poll_interval_secs == 0 || split_poll_interval_secs >= SECS_PER_DAY {
			return Err(ConfigError::Validation(format!(
				"split_poll_interval_secs must be between 1 and {}, got {split_poll_interval_secs}",
				SECS_PER_DAY - 1
			)));
		}

		Ok(StopwatchConfig {
			day_start_hour,
			utc_offset,
			split_poll_interval_secs,
		})
	}
}

impl From<&StopwatchConfig> for StopwatchConfigLayer {
	fn from(config: &StopwatchConfig) -> Self {
		Self {
			day_start_hour: Some(config.day_start_hour.get()),
			utc_offset: Some(config.utc_offset.to_string()),
			split_poll_interval_secs: Some(config.split_poll_interval_secs),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_layer_finalize_defaults() {
		let config = StopwatchConfigLayer::default().finalize().unwrap();
		assert_eq!(config.day_start_hour.get(), 8);
		assert_eq!(config.split_poll_interval(), Duration::from_secs(60));
	}

	#[test]
	fn test_invalid_day_start_hour_rejected() {
		let layer = StopwatchConfigLayer {
			day_start_hour: Some(24),
			..Default::default()
		};
		let err = layer.finalize().unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
		assert!(err.to_string().contains("day start hour"));
	}

	#[test]
	fn test_invalid_offset_rejected() {
		let layer = StopwatchConfigLayer {
			utc_offset: Some("two hours east".to_string()),
			..Default::default()
		};
		assert!(matches!(
			layer.finalize(),
			Err(ConfigError::InvalidValue { .. })
		));
	}

	#[test]
	fn test_poll_interval_bounds() {
		for bad in [0, SECS_PER_DAY] {
			let layer = StopwatchConfigLayer {
				split_poll_interval_secs: Some(bad),
				..Default::default()
			};
			assert!(layer.finalize().is_err(), "interval {bad} should be rejected");
		}
	}

	#[test]
	fn test_boundary_uses_configured_offset() {
		let layer = StopwatchConfigLayer {
			day_start_hour: Some(6),
			utc_offset: Some("+03:00".to_string()),
			split_poll_interval_secs: None,
		};
		let config = layer.finalize().unwrap();
		let boundary = config.boundary();
		assert_eq!(boundary.start_hour().get(), 6);
		assert_eq!(boundary.offset().local_minus_utc(), 3 * 3600);
	}

	#[test]
	fn test_layer_round_trips_resolved_offset() {
		let layer = StopwatchConfigLayer {
			utc_offset: Some("-04:30".to_string()),
			..Default::default()
		};
		let config = layer.finalize().unwrap();
		let back = StopwatchConfigLayer::from(&config);
		assert_eq!(back.utc_offset.as_deref(), Some("-04:30"));
	}
}
