// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Test doubles shared by the state, worker and route tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::watch;

use stopwatch_core::{DayBoundary, DayStartHour, ManualClock, Session};
use stopwatch_server_db::testing::create_sessions_test_pool;
use stopwatch_server_db::{Result as StoreResult, SessionStore, SqliteSessionStore, StoreError};

use crate::broadcast::UpdateBroadcaster;
use crate::state::StopwatchState;

/// SQLite-backed store whose individual operations can be made to fail.
pub struct FlakyStore {
	inner: SqliteSessionStore,
	pub fail_insert: AtomicBool,
	pub fail_close: AtomicBool,
	pub fail_last: AtomicBool,
	pub fail_range: AtomicBool,
}

impl FlakyStore {
	pub async fn new() -> Self {
		Self {
			inner: SqliteSessionStore::new(create_sessions_test_pool().await),
			fail_insert: AtomicBool::new(false),
			fail_close: AtomicBool::new(false),
			fail_last: AtomicBool::new(false),
			fail_range: AtomicBool::new(false),
		}
	}

	fn check(flag: &AtomicBool) -> StoreResult<()> {
		if flag.load(Ordering::SeqCst) {
			Err(StoreError::Database(sqlx::Error::PoolClosed))
		} else {
			Ok(())
		}
	}
}

#[async_trait]
impl SessionStore for FlakyStore {
	async fn insert_open(&self, session: &Session) -> StoreResult<()> {
		Self::check(&self.fail_insert)?;
		self.inner.insert_open(session).await
	}

	async fn close_session(&self, session: &Session) -> StoreResult<()> {
		Self::check(&self.fail_close)?;
		self.inner.close_session(session).await
	}

	async fn last_session(&self) -> StoreResult<Option<Session>> {
		Self::check(&self.fail_last)?;
		self.inner.last_session().await
	}

	async fn sessions_in_range(
		&self,
		from: DateTime<Utc>,
		to: DateTime<Utc>,
	) -> StoreResult<Vec<Session>> {
		Self::check(&self.fail_range)?;
		self.inner.sessions_in_range(from, to).await
	}
}

/// Everything a state test needs to drive and observe a [`StopwatchState`].
pub struct Harness {
	pub state: Arc<StopwatchState>,
	pub store: Arc<FlakyStore>,
	pub clock: ManualClock,
	pub updates: UpdateBroadcaster,
	shutdown: watch::Sender<bool>,
}

impl Harness {
	/// UTC days starting at 08:00, clock at `start`.
	pub async fn new(start: DateTime<Utc>) -> Self {
		Self::with_store(start, Arc::new(FlakyStore::new().await)).await
	}

	pub async fn with_store(start: DateTime<Utc>, store: Arc<FlakyStore>) -> Self {
		let clock = ManualClock::new(start);
		let (shutdown, shutdown_rx) = watch::channel(false);
		let (updates, _handle) = UpdateBroadcaster::spawn(shutdown_rx);
		let boundary = DayBoundary::utc(DayStartHour::default());
		let state = StopwatchState::load(
			store.clone(),
			Arc::new(clock.clone()),
			boundary,
			updates.clone(),
		)
		.await
		.unwrap();

		Self {
			state: Arc::new(state),
			store,
			clock,
			updates,
			shutdown,
		}
	}

	/// Stop the broadcaster coordinator; later subscribes fail with `Closed`.
	pub fn stop_broadcaster(&self) {
		let _ = self.shutdown.send(true);
	}
}

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
	Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}
