// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session store: the persistence contract the stopwatch relies on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::instrument;

use stopwatch_core::{to_millis, Session};

use crate::error::{Result, StoreError};

/// Persistence operations for sessions.
///
/// Sessions are keyed by their start instant. Implementations must make each
/// call durable before returning `Ok`.
#[async_trait]
pub trait SessionStore: Send + Sync {
	/// Persist a new open session.
	async fn insert_open(&self, session: &Session) -> Result<()>;

	/// Record the end of the open session identified by `session.start`.
	async fn close_session(&self, session: &Session) -> Result<()>;

	/// The session with the latest start, open or closed.
	async fn last_session(&self) -> Result<Option<Session>>;

	/// Sessions with `from <= start < to`, ordered by start.
	async fn sessions_in_range(&self, from: DateTime<Utc>, to: DateTime<Utc>)
		-> Result<Vec<Session>>;
}

/// SQLite implementation of the session store.
#[derive(Clone)]
pub struct SqliteSessionStore {
	pool: SqlitePool,
}

impl SqliteSessionStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[derive(sqlx::FromRow)]
struct SessionRow {
	start: i64,
	end: Option<i64>,
}

impl TryFrom<SessionRow> for Session {
	type Error = StoreError;

	fn try_from(row: SessionRow) -> Result<Self> {
		Session::from_millis(row.start, row.end)
			.map_err(|e| StoreError::InvalidData(format!("session starting at {}: {e}", row.start)))
	}
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
	#[instrument(skip(self, session), fields(start = session.start_ms()))]
	async fn insert_open(&self, session: &Session) -> Result<()> {
		sqlx::query(r#"INSERT INTO sessions (start, "end") VALUES (?, NULL)"#)
			.bind(session.start_ms())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	#[instrument(skip(self, session), fields(start = session.start_ms(), end = ?session.end_ms()))]
	async fn close_session(&self, session: &Session) -> Result<()> {
		let Some(end_ms) = session.end_ms() else {
			return Err(StoreError::InvalidData(format!(
				"cannot close session starting at {} without an end",
				session.start_ms()
			)));
		};

		let result = sqlx::query(r#"UPDATE sessions SET "end" = ? WHERE start = ? AND "end" IS NULL"#)
			.bind(end_ms)
			.bind(session.start_ms())
			.execute(&self.pool)
			.await?;

		if result.rows_affected() == 0 {
			return Err(StoreError::NotFound(session.start_ms()));
		}
		Ok(())
	}

	#[instrument(skip(self))]
	async fn last_session(&self) -> Result<Option<Session>> {
		let row = sqlx::query_as::<_, SessionRow>(
			r#"SELECT start, "end" FROM sessions ORDER BY start DESC LIMIT 1"#,
		)
		.fetch_optional(&self.pool)
		.await?;

		row.map(Session::try_from).transpose()
	}

	#[instrument(skip(self), fields(from = %from, to = %to))]
	async fn sessions_in_range(
		&self,
		from: DateTime<Utc>,
		to: DateTime<Utc>,
	) -> Result<Vec<Session>> {
		let rows = sqlx::query_as::<_, SessionRow>(
			r#"
			SELECT start, "end" FROM sessions
			WHERE start >= ? AND start < ?
			ORDER BY start ASC
			"#,
		)
		.bind(to_millis(from))
		.bind(to_millis(to))
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(Session::try_from).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_sessions_test_pool;
	use chrono::{Duration, TimeZone};

	fn t0() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap()
	}

	async fn make_store() -> SqliteSessionStore {
		SqliteSessionStore::new(create_sessions_test_pool().await)
	}

	#[tokio::test]
	async fn test_insert_and_close_round_trip() {
		let store = make_store().await;
		let open = Session::open_at(t0());
		store.insert_open(&open).await.unwrap();

		let last = store.last_session().await.unwrap().unwrap();
		assert!(last.is_open());
		assert_eq!(last.start, t0());

		let closed = open.close_at(t0() + Duration::seconds(90)).unwrap();
		store.close_session(&closed).await.unwrap();

		let last = store.last_session().await.unwrap().unwrap();
		assert_eq!(last, closed);
		assert_eq!(last.duration_ms(), 90_000);
	}

	#[tokio::test]
	async fn test_last_session_empty() {
		let store = make_store().await;
		assert!(store.last_session().await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_close_unknown_session_is_not_found() {
		let store = make_store().await;
		let closed = Session::open_at(t0()).close_at(t0() + Duration::seconds(1)).unwrap();
		let err = store.close_session(&closed).await.unwrap_err();
		assert!(matches!(err, StoreError::NotFound(_)));
	}

	#[tokio::test]
	async fn test_close_already_closed_is_not_found() {
		let store = make_store().await;
		let open = Session::open_at(t0());
		store.insert_open(&open).await.unwrap();
		let closed = open.close_at(t0() + Duration::seconds(5)).unwrap();
		store.close_session(&closed).await.unwrap();

		let again = open.close_at(t0() + Duration::seconds(10)).unwrap();
		assert!(matches!(
			store.close_session(&again).await,
			Err(StoreError::NotFound(_))
		));
		let last = store.last_session().await.unwrap().unwrap();
		assert_eq!(last.end_ms(), closed.end_ms());
	}

	#[tokio::test]
	async fn test_close_requires_end() {
		let store = make_store().await;
		let open = Session::open_at(t0());
		store.insert_open(&open).await.unwrap();
		assert!(matches!(
			store.close_session(&open).await,
			Err(StoreError::InvalidData(_))
		));
	}

	#[tokio::test]
	async fn test_duplicate_start_rejected() {
		let store = make_store().await;
		let open = Session::open_at(t0());
		store.insert_open(&open).await.unwrap();
		assert!(matches!(
			store.insert_open(&open).await,
			Err(StoreError::Database(_))
		));
	}

	#[tokio::test]
	async fn test_sessions_in_range_half_open_and_ordered() {
		let store = make_store().await;
		let from = t0();
		let to = t0() + Duration::hours(24);

		for (offset_min, len_min) in [(60, 10), (-5, 10), (0, 30), (24 * 60, 5)] {
			let start = t0() + Duration::minutes(offset_min);
			let open = Session::open_at(start);
			store.insert_open(&open).await.unwrap();
			let closed = open.close_at(start + Duration::minutes(len_min)).unwrap();
			store.close_session(&closed).await.unwrap();
		}
		let trailing = Session::open_at(t0() + Duration::hours(3));
		store.insert_open(&trailing).await.unwrap();

		let sessions = store.sessions_in_range(from, to).await.unwrap();
		let starts: Vec<_> = sessions.iter().map(|s| s.start).collect();
		assert_eq!(
			starts,
			vec![t0(), t0() + Duration::minutes(60), t0() + Duration::hours(3)]
		);
		assert!(sessions[2].is_open());
		assert_eq!(sessions[0].duration_ms(), 30 * 60 * 1000);
	}

	#[tokio::test]
	async fn test_corrupt_row_reported_as_invalid_data() {
		let pool = create_sessions_test_pool().await;
		sqlx::query(r#"INSERT INTO sessions (start, "end") VALUES (1000, 500)"#)
			.execute(&pool)
			.await
			.unwrap();

		let store = SqliteSessionStore::new(pool);
		assert!(matches!(
			store.last_session().await,
			Err(StoreError::InvalidData(_))
		));
	}

	mod proptests {
		use super::*;
		use proptest::prelude::*;
		use std::collections::BTreeSet;

		proptest! {
			#![proptest_config(ProptestConfig::with_cases(24))]

			#[test]
			fn sessions_in_range_matches_filter(
				offsets in prop::collection::btree_set(-2_000i64..4_000, 0..12),
				from_min in -1_000i64..2_000,
				len_min in 0i64..2_000,
			) {
				let rt = tokio::runtime::Runtime::new().unwrap();
				rt.block_on(async {
					let store = make_store().await;
					for offset in &offsets {
						let start = t0() + Duration::minutes(*offset);
						let open = Session::open_at(start);
						store.insert_open(&open).await.unwrap();
						let closed = open.close_at(start + Duration::seconds(30)).unwrap();
						store.close_session(&closed).await.unwrap();
					}

					let from = t0() + Duration::minutes(from_min);
					let to = from + Duration::minutes(len_min);
					let got: Vec<_> = store
						.sessions_in_range(from, to)
						.await
						.unwrap()
						.iter()
						.map(|s| s.start)
						.collect();
					let expected: Vec<_> = offsets
						.iter()
						.map(|o| t0() + Duration::minutes(*o))
						.filter(|start| *start >= from && *start < to)
						.collect::<BTreeSet<_>>()
						.into_iter()
						.collect();
					prop_assert_eq!(got, expected);
					Ok(())
				})?;
			}
		}
	}
}
