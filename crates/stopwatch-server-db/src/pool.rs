// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqliteSynchronous};
use std::str::FromStr;

use crate::error::{Result, StoreError};

/// Create a SqlitePool with WAL mode and common settings.
///
/// # Arguments
/// * `database_url` - SQLite connection string (e.g., "sqlite:./stopwatch.db")
///
/// # Errors
/// Returns `StoreError::InvalidConfig` if the URL is invalid, or
/// `StoreError::Database` if the connection fails.
#[tracing::instrument(skip(database_url))]
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
	let options = SqliteConnectOptions::from_str(database_url)
		.map_err(|e| StoreError::InvalidConfig(format!("Invalid database URL: {e}")))?
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.create_if_missing(true);

	let pool = SqlitePool::connect_with(options).await?;

	tracing::debug!("database pool created");
	Ok(pool)
}

/// Create the `sessions` table and its index if they do not exist.
///
/// Timestamps are milliseconds since the Unix epoch. An open session has a
/// NULL `end`.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS sessions (
			start INTEGER PRIMARY KEY,
			"end" INTEGER NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query(r#"CREATE INDEX IF NOT EXISTS idx_sessions_end ON sessions("end")"#)
		.execute(pool)
		.await?;

	tracing::debug!("migrations applied");
	Ok(())
}
