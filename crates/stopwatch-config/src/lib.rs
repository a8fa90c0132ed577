// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the stopwatch server and its CLI client.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`STOPWATCH_*`)
//!
//! # Usage
//!
//! ```ignore
//! use stopwatch_config::load_config;
//!
//! let config = load_config()?;
//! println!("Serving on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::debug;

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
	pub stopwatch: StopwatchConfig,
	pub database: DatabaseConfig,
	pub http: HttpConfig,
	pub logging: LoggingConfig,
}

impl Config {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}

	/// Render this configuration as a TOML document.
	pub fn to_toml(&self) -> Result<String, ConfigError> {
		let layer = ConfigLayer {
			stopwatch: Some((&self.stopwatch).into()),
			database: Some((&self.database).into()),
			http: Some((&self.http).into()),
			logging: Some((&self.logging).into()),
		};
		Ok(toml::to_string_pretty(&layer)?)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`STOPWATCH_*`)
/// 2. Config file (`/etc/stopwatch/stopwatch.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<Config, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<Config, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// The built-in defaults rendered as TOML, suitable as a starting config file.
pub fn default_config_toml() -> Result<String, ConfigError> {
	finalize(ConfigLayer::default())?.to_toml()
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<Config, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ConfigLayer) -> Result<Config, ConfigError> {
	Ok(Config {
		stopwatch: layer.stopwatch.unwrap_or_default().finalize()?,
		database: layer.database.unwrap_or_default().finalize(),
		http: layer.http.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use std::io::Write;

	#[test]
	fn test_socket_addr() {
		let config = Config {
			http: HttpConfig {
				host: "0.0.0.0".to_string(),
				port: 9000,
				href_prefix: String::new(),
			},
			..Default::default()
		};
		assert_eq!(config.socket_addr(), "0.0.0.0:9000");
	}

	#[test]
	fn test_default_config_toml_parses_back() {
		let rendered = default_config_toml().unwrap();
		assert!(rendered.contains("[stopwatch]"));
		assert!(rendered.contains("day_start_hour = 8"));
		assert!(rendered.contains("url = \"sqlite:./stopwatch.db\""));

		let layer: ConfigLayer = toml::from_str(&rendered).unwrap();
		let reparsed = finalize(layer).unwrap();
		assert_eq!(reparsed.http, HttpConfig::default());
		assert_eq!(reparsed.database, DatabaseConfig::default());
		assert_eq!(reparsed.stopwatch.day_start_hour.get(), 8);
	}

	#[test]
	fn test_file_overrides_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			"[stopwatch]\nday_start_hour = 5\nutc_offset = \"+01:00\"\n\n[http]\nhref_prefix = \"/sw\""
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		let config = finalize(layer).unwrap();
		assert_eq!(config.stopwatch.day_start_hour.get(), 5);
		assert_eq!(config.stopwatch.utc_offset.local_minus_utc(), 3600);
		assert_eq!(config.http.href_prefix, "/sw");
		assert_eq!(config.http.port, 8080);
	}

	#[test]
	fn test_invalid_section_fails_finalize() {
		let layer = ConfigLayer {
			stopwatch: Some(StopwatchConfigLayer {
				day_start_hour: Some(30),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	proptest! {
		#[test]
		fn later_layers_win(first in 1u16.., second in 1u16..) {
			let mut merged = ConfigLayer::default();
			for port in [first, second] {
				merged.merge(ConfigLayer {
					http: Some(HttpConfigLayer { port: Some(port), ..Default::default() }),
					..Default::default()
				});
			}
			let config = finalize(merged).unwrap();
			prop_assert_eq!(config.http.port, second);
		}
	}
}
