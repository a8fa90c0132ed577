// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The stopwatch aggregate.
//!
//! All reads and writes go through one `tokio::sync::Mutex` held across the
//! store round-trip, so Start, Stop and the day split never interleave. Every
//! store write happens before the in-memory ledger changes; a failed write
//! leaves the ledger as it was. Pulses are published after the lock is
//! released.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use stopwatch_core::{Clock, DayBoundary, DayStat, Session, SessionSpan, Snapshot};
use stopwatch_server_db::SessionStore;

use crate::broadcast::UpdateBroadcaster;
use crate::error::Result;

/// In-memory view of the tracked day.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Ledger {
	day_start: DateTime<Utc>,
	/// Sum of `today` durations.
	elapsed_ms: i64,
	today: Vec<Session>,
	open: Option<Session>,
}

impl Ledger {
	fn empty(day_start: DateTime<Utc>) -> Self {
		Self {
			day_start,
			elapsed_ms: 0,
			today: Vec::new(),
			open: None,
		}
	}

	fn snapshot(&self, boundary: &DayBoundary, now: DateTime<Utc>) -> Snapshot {
		let running_ms = self.open.as_ref().map_or(0, |s| s.running_ms(now));
		Snapshot {
			elapsed_ms: self.elapsed_ms + running_ms,
			running: self.open.is_some(),
			day_label: boundary.label(self.day_start),
		}
	}
}

/// Result of a day rollover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rollover {
	/// The boundary the tracked day was reset to.
	pub boundary: DateTime<Utc>,
	/// Whether an open session was split at `boundary`.
	pub split: bool,
}

pub struct StopwatchState {
	ledger: Mutex<Ledger>,
	store: Arc<dyn SessionStore>,
	clock: Arc<dyn Clock>,
	boundary: DayBoundary,
	updates: UpdateBroadcaster,
}

impl StopwatchState {
	/// Build the state for the day containing the clock's current instant and
	/// populate it from the store.
	pub async fn load(
		store: Arc<dyn SessionStore>,
		clock: Arc<dyn Clock>,
		boundary: DayBoundary,
		updates: UpdateBroadcaster,
	) -> Result<Self> {
		let day_start = boundary.day_start(clock.now());
		let state = Self {
			ledger: Mutex::new(Ledger::empty(day_start)),
			store,
			clock,
			boundary,
			updates,
		};
		state.load_today().await?;
		Ok(state)
	}

	pub fn boundary(&self) -> &DayBoundary {
		&self.boundary
	}

	pub fn now(&self) -> DateTime<Utc> {
		self.clock.now()
	}

	pub fn updates(&self) -> &UpdateBroadcaster {
		&self.updates
	}

	/// Open a session now unless one is already running.
	#[instrument(skip(self))]
	pub async fn start(&self) -> Result<Snapshot> {
		let mut ledger = self.ledger.lock().await;
		let now = self.clock.now();
		if ledger.open.is_some() {
			debug!("already running");
			return Ok(ledger.snapshot(&self.boundary, now));
		}

		let session = Session::open_at(now);
		self.store.insert_open(&session).await?;
		info!(start = session.start_ms(), "stopwatch started");
		ledger.open = Some(session);

		let snapshot = ledger.snapshot(&self.boundary, now);
		drop(ledger);
		self.updates.publish();
		Ok(snapshot)
	}

	/// Close the running session now. No-op when stopped.
	#[instrument(skip(self))]
	pub async fn stop(&self) -> Result<Snapshot> {
		let mut ledger = self.ledger.lock().await;
		let now = self.clock.now();
		let Some(open) = ledger.open.as_ref() else {
			debug!("not running");
			return Ok(ledger.snapshot(&self.boundary, now));
		};

		let closed = open.close_at(now.max(open.start))?;
		self.store.close_session(&closed).await?;
		info!(
			start = closed.start_ms(),
			duration_ms = closed.duration_ms(),
			"stopwatch stopped"
		);
		ledger.elapsed_ms += closed.duration_ms();
		ledger.today.push(closed);
		ledger.open = None;

		let snapshot = ledger.snapshot(&self.boundary, now);
		drop(ledger);
		self.updates.publish();
		Ok(snapshot)
	}

	pub async fn snapshot(&self) -> Snapshot {
		let ledger = self.ledger.lock().await;
		ledger.snapshot(&self.boundary, self.clock.now())
	}

	/// Reload the tracked day from the store.
	///
	/// A session still open from an earlier day is split at the tracked day's
	/// start first, so only its second half counts toward today.
	#[instrument(skip(self))]
	pub async fn load_today(&self) -> Result<()> {
		let mut ledger = self.ledger.lock().await;
		let day_start = ledger.day_start;
		let before = ledger.clone();
		let result = self.settle_day(&mut ledger, day_start).await;
		let changed = *ledger != before;
		drop(ledger);

		if changed {
			self.updates.publish();
		}
		result.map(|_| ())
	}

	/// Today's closed sessions in start order, then the open one.
	pub async fn sessions_today(&self) -> Vec<SessionSpan> {
		let ledger = self.ledger.lock().await;
		ledger
			.today
			.iter()
			.chain(ledger.open.iter())
			.map(Session::to_span)
			.collect()
	}

	/// Sessions of the tracked day containing `instant`, read from the store.
	#[instrument(skip(self))]
	pub async fn sessions_for_day(&self, instant: DateTime<Utc>) -> Result<Vec<SessionSpan>> {
		let _ledger = self.ledger.lock().await;
		let day_start = self.boundary.day_start(instant);
		let sessions = self
			.store
			.sessions_in_range(day_start, day_start + Duration::hours(24))
			.await?;
		Ok(sessions.iter().map(Session::to_span).collect())
	}

	/// Closed running time per day, from the day containing `from` up to the
	/// last day starting before `to`. Days without sessions report zero.
	#[instrument(skip(self))]
	pub async fn day_stats(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<DayStat>> {
		let _ledger = self.ledger.lock().await;

		let mut totals = BTreeMap::new();
		let mut day = self.boundary.day_start(from);
		while day < to {
			totals.insert(day, 0_i64);
			day += Duration::hours(24);
		}
		let (Some(&first), Some(&last)) = (totals.keys().next(), totals.keys().next_back()) else {
			return Ok(Vec::new());
		};

		let sessions = self
			.store
			.sessions_in_range(first, last + Duration::hours(24))
			.await?;
		for session in sessions.iter().filter(|s| !s.is_open()) {
			if let Some(total) = totals.get_mut(&self.boundary.day_start(session.start)) {
				*total += session.duration_ms();
			}
		}

		Ok(totals
			.into_iter()
			.map(|(day_start, elapsed_ms)| DayStat {
				day_start,
				elapsed_ms,
			})
			.collect())
	}

	/// Move the tracked day to `boundary`, splitting the most recent session
	/// at `boundary` if it is still open and started before it.
	#[instrument(skip(self))]
	pub(crate) async fn roll_over(&self, boundary: DateTime<Utc>) -> Result<Rollover> {
		let mut ledger = self.ledger.lock().await;
		let before = ledger.clone();
		let result = self.settle_day(&mut ledger, boundary).await;
		let changed = *ledger != before;
		drop(ledger);

		if result.is_ok() || changed {
			self.updates.publish();
		}
		Ok(Rollover {
			boundary,
			split: result?,
		})
	}

	/// Bring the ledger to the day starting at `day_start` and reload it.
	/// Returns whether an open session was split at `day_start`.
	///
	/// The split is two store writes, close then insert. If the close lands
	/// and the insert fails the ledger is marked stopped, matching the store.
	/// A failed reload after a split or day change leaves the ledger on the
	/// new day with only the open session.
	async fn settle_day(&self, ledger: &mut Ledger, day_start: DateTime<Utc>) -> Result<bool> {
		let mut split = false;
		let last = self.store.last_session().await?;
		if let Some(session) = last.filter(|s| s.is_open() && s.start < day_start) {
			let (head, tail) = session.split_at(day_start)?;
			self.store.close_session(&head).await?;
			if let Err(e) = self.store.insert_open(&tail).await {
				warn!(start = head.start_ms(), error = %e, "split closed session but could not reopen it");
				ledger.open = None;
				return Err(e.into());
			}
			info!(
				start = head.start_ms(),
				boundary = tail.start_ms(),
				"split session at day boundary"
			);
			split = true;
			*ledger = Ledger {
				open: Some(tail),
				..Ledger::empty(day_start)
			};
		} else if ledger.day_start != day_start {
			let open = ledger.open.take();
			*ledger = Ledger {
				open,
				..Ledger::empty(day_start)
			};
		}

		*ledger = self.read_day(day_start).await?;
		Ok(split)
	}

	/// Read the tracked day starting at `day_start`. Does not lock.
	async fn read_day(&self, day_start: DateTime<Utc>) -> Result<Ledger> {
		let day_end = day_start + Duration::hours(24);
		let sessions = self.store.sessions_in_range(day_start, day_end).await?;

		let mut ledger = Ledger::empty(day_start);
		for session in sessions {
			if session.is_open() {
				if let Some(previous) = ledger.open.replace(session) {
					warn!(
						start = previous.start_ms(),
						"more than one open session today, keeping the latest"
					);
				}
			} else {
				ledger.elapsed_ms += session.duration_ms();
				ledger.today.push(session);
			}
		}

		debug!(
			day_start = %day_start,
			sessions = ledger.today.len(),
			elapsed_ms = ledger.elapsed_ms,
			running = ledger.open.is_some(),
			"loaded tracked day"
		);
		Ok(ledger)
	}
}
