// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Single-user stopwatch server.
//!
//! - [`state::StopwatchState`]: the start/stop aggregate behind one lock
//! - [`split::DaySplitWorker`]: rolls the tracked day over at the boundary
//! - [`broadcast::UpdateBroadcaster`]: fans state-change pulses out to
//!   WebSocket subscribers
//! - [`api::create_router`]: the HTTP surface
//! - [`client::StopwatchClient`]: the CLI's view of a running server

pub mod api;
pub mod broadcast;
pub mod client;
pub mod error;
pub mod routes;
pub mod server;
pub mod split;
pub mod state;

#[cfg(test)]
mod testing;

pub use api::{create_router, AppState};
pub use broadcast::{Pulse, SubscriberId, Subscription, UpdateBroadcaster};
pub use client::{render_status, ClientAction, StopwatchClient};
pub use error::{BroadcastError, ClientError, Result, ServeError, ServerError, StopwatchError};
pub use server::serve;
pub use split::DaySplitWorker;
pub use state::{Rollover, StopwatchState};
