// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Background worker that rolls the tracked day over at the day boundary.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::state::{Rollover, StopwatchState};

pub struct DaySplitWorker {
	state: Arc<StopwatchState>,
	poll_interval: Duration,
	next_boundary: DateTime<Utc>,
}

impl DaySplitWorker {
	pub fn new(state: Arc<StopwatchState>, poll_interval: Duration) -> Self {
		let next_boundary = state.boundary().day_end(state.now());
		Self {
			state,
			poll_interval,
			next_boundary,
		}
	}

	pub fn next_boundary(&self) -> DateTime<Utc> {
		self.next_boundary
	}

	/// Roll over if the next boundary has passed. `Ok(None)` when it has not.
	///
	/// On error `next_boundary` is kept so the following tick retries.
	pub async fn tick(&mut self) -> Result<Option<Rollover>> {
		let now = self.state.now();
		if now < self.next_boundary {
			return Ok(None);
		}

		let boundary = self.state.boundary().day_start(now);
		let rollover = self.state.roll_over(boundary).await?;
		self.next_boundary = self.state.boundary().day_end(now);
		info!(
			boundary = %rollover.boundary,
			split = rollover.split,
			next_boundary = %self.next_boundary,
			"day rolled over"
		);
		Ok(Some(rollover))
	}

	/// Poll until `shutdown` flips to `true`.
	pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
		info!(
			next_boundary = %self.next_boundary,
			poll_interval_secs = self.poll_interval.as_secs(),
			"day split worker started"
		);

		loop {
			tokio::select! {
				biased;

				changed = shutdown.changed() => {
					if changed.is_err() || *shutdown.borrow() {
						info!("shutdown signal received");
						break;
					}
				}

				_ = tokio::time::sleep(self.poll_interval) => {
					match self.tick().await {
						Ok(Some(_)) => {}
						Ok(None) => debug!("day boundary not reached"),
						Err(e) => warn!(error = %e, next_boundary = %self.next_boundary, "day rollover failed, will retry"),
					}
				}
			}
		}

		info!("day split worker stopped");
	}

	pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
		tokio::spawn(self.run(shutdown))
	}
}
