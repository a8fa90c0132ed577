// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server mode: wires the store, state, background tasks and router together.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing::{info, warn};

use stopwatch_config::Config;
use stopwatch_core::SystemClock;
use stopwatch_server_db::{create_pool, run_migrations, SessionStore, SqliteSessionStore};

use crate::api::{create_router, AppState};
use crate::broadcast::UpdateBroadcaster;
use crate::error::ServeError;
use crate::split::DaySplitWorker;
use crate::state::StopwatchState;

/// Run the server until `shutdown_signal` resolves.
///
/// On shutdown the broadcaster closes every subscriber, which ends open
/// WebSocket connections, and the day-split worker stops.
pub async fn serve<F>(config: Config, shutdown_signal: F) -> Result<(), ServeError>
where
	F: Future<Output = ()> + Send + 'static,
{
	info!(
		host = %config.http.host,
		port = config.http.port,
		href_prefix = %config.http.href_prefix,
		database = %config.database.url,
		"starting stopwatch server"
	);

	let pool = create_pool(&config.database.url).await?;
	run_migrations(&pool).await?;
	let store: Arc<dyn SessionStore> = Arc::new(SqliteSessionStore::new(pool));

	let (shutdown_tx, shutdown_rx) = watch::channel(false);
	let (updates, broadcaster_handle) = UpdateBroadcaster::spawn(shutdown_rx.clone());

	let state = Arc::new(
		StopwatchState::load(
			store,
			Arc::new(SystemClock),
			config.stopwatch.boundary(),
			updates,
		)
		.await?,
	);

	let worker_handle =
		DaySplitWorker::new(state.clone(), config.stopwatch.split_poll_interval()).spawn(shutdown_rx);

	let app = create_router(AppState::new(state), &config.http.href_prefix)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	let addr = config.socket_addr();
	let listener = tokio::net::TcpListener::bind(&addr).await?;
	info!(%addr, "listening");

	let graceful = async move {
		shutdown_signal.await;
		info!("Received shutdown signal");
		let _ = shutdown_tx.send(true);
	};
	axum::serve(listener, app)
		.with_graceful_shutdown(graceful)
		.await?;

	for (name, handle) in [("broadcaster", broadcaster_handle), ("day split worker", worker_handle)] {
		if let Err(e) = handle.await {
			warn!(task = name, error = %e, "background task ended abnormally");
		}
	}

	info!("Server shutdown complete");
	Ok(())
}
