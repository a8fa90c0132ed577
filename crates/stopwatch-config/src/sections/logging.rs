// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logging configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const DEFAULT_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
	/// Default `EnvFilter` directive when `RUST_LOG` is unset.
	pub level: String,
	/// Append logs to this file instead of stdout.
	pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: DEFAULT_LEVEL.to_string(),
			file: None,
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfigLayer {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub level: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file: Option<PathBuf>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.file.is_some() {
			self.file = other.file;
		}
	}

	pub fn finalize(self) -> LoggingConfig {
		LoggingConfig {
			level: self.level.unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
			file: self.file.filter(|p| !p.as_os_str().is_empty()),
		}
	}
}

impl From<&LoggingConfig> for LoggingConfigLayer {
	fn from(config: &LoggingConfig) -> Self {
		Self {
			level: Some(config.level.clone()),
			file: config.file.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_file_means_stdout() {
		let layer = LoggingConfigLayer {
			level: None,
			file: Some(PathBuf::new()),
		};
		let config = layer.finalize();
		assert_eq!(config.level, "info");
		assert!(config.file.is_none());
	}
}
