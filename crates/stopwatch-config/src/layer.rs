// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration as produced by a single source.

use serde::{Deserialize, Serialize};

use crate::sections::{DatabaseConfigLayer, HttpConfigLayer, LoggingConfigLayer, StopwatchConfigLayer};

/// One source's contribution. Sections a source does not mention stay `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfigLayer {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stopwatch: Option<StopwatchConfigLayer>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub http: Option<HttpConfigLayer>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub logging: Option<LoggingConfigLayer>,
}

impl ConfigLayer {
	/// Overlay `other` on top of `self`; fields set in `other` win.
	pub fn merge(&mut self, other: ConfigLayer) {
		merge_section(&mut self.stopwatch, other.stopwatch, StopwatchConfigLayer::merge);
		merge_section(&mut self.database, other.database, DatabaseConfigLayer::merge);
		merge_section(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	match (base.as_mut(), other) {
		(Some(existing), Some(incoming)) => merge(existing, incoming),
		(None, Some(incoming)) => *base = Some(incoming),
		(_, None) => {}
	}
}
