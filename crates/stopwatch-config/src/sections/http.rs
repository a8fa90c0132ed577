// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP server configuration.

use serde::{Deserialize, Serialize};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HREF_PREFIX: &str = "/stopwatch";

/// HTTP configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
	pub host: String,
	pub port: u16,
	/// Path prefix of every route, e.g. when served behind a proxy.
	/// Empty or `/`-prefixed, never `/`-terminated.
	pub href_prefix: String,
}

impl Default for HttpConfig {
	fn default() -> Self {
		Self {
			host: DEFAULT_HOST.to_string(),
			port: DEFAULT_PORT,
			href_prefix: DEFAULT_HREF_PREFIX.to_string(),
		}
	}
}

impl HttpConfig {
	/// Base URL a local client uses to reach the server.
	pub fn local_base_url(&self) -> String {
		let mut url = "http://localhost".to_string();
		if self.port != 80 {
			url.push_str(&format!(":{}", self.port));
		}
		url.push_str(&self.href_prefix);
		url
	}
}

/// HTTP configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HttpConfigLayer {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub host: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub port: Option<u16>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub href_prefix: Option<String>,
}

impl HttpConfigLayer {
	pub fn merge(&mut self, other: HttpConfigLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
		if other.href_prefix.is_some() {
			self.href_prefix = other.href_prefix;
		}
	}

	pub fn finalize(self) -> HttpConfig {
		HttpConfig {
			host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
			port: self.port.unwrap_or(DEFAULT_PORT),
			href_prefix: normalize_prefix(
				self
					.href_prefix
					.as_deref()
					.unwrap_or(DEFAULT_HREF_PREFIX),
			),
		}
	}
}

impl From<&HttpConfig> for HttpConfigLayer {
	fn from(config: &HttpConfig) -> Self {
		Self {
			host: Some(config.host.clone()),
			port: Some(config.port),
			href_prefix: Some(config.href_prefix.clone()),
		}
	}
}

fn normalize_prefix(prefix: &str) -> String {
	let trimmed = prefix.trim().trim_matches('/');
	if trimmed.is_empty() {
		String::new()
	} else {
		format!("/{trimmed}")
	}
}
