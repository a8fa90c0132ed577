// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the stopwatch.
//!
//! This crate is free of I/O. It provides:
//! - [`Session`]: one contiguous running interval, open or closed
//! - [`DayBoundary`]: day start/end arithmetic for a configured day-start hour
//! - [`Clock`]: the time source, with a [`ManualClock`] for deterministic tests
//! - Wire types shared by the server and the CLI client

pub mod boundary;
pub mod clock;
pub mod error;
pub mod session;
pub mod stats;

pub use boundary::{parse_utc_offset, DayBoundary, DayStartHour};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, Result};
pub use session::{from_millis, to_millis, Session, SessionSpan, SessionState};
pub use stats::{format_elapsed, DayStat, DayStatEntry, Snapshot};
