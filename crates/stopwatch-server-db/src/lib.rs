// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session persistence for the stopwatch server.
//!
//! [`SessionStore`] is the contract the stopwatch state is written against;
//! [`SqliteSessionStore`] implements it on a `sqlx` SQLite pool.

pub mod error;
pub mod pool;
pub mod store;
pub mod testing;

pub use error::{Result, StoreError};
pub use pool::{create_pool, run_migrations};
pub use store::{SessionStore, SqliteSessionStore};
