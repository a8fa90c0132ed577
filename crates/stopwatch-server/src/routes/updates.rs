// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Push channel: one WebSocket text frame `update` per state change.

use axum::{
	extract::{
		ws::{Message, WebSocket},
		State, WebSocketUpgrade,
	},
	response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info};

use crate::api::AppState;
use crate::broadcast::Subscription;
use crate::error::ServerError;

const UPDATE_FRAME: &str = "update";

/// GET /updates
///
/// Registers the subscriber before upgrading; a stopped broadcaster is a 503.
pub async fn ws_upgrade_handler(
	ws: WebSocketUpgrade,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
	let subscription = state.stopwatch.updates().subscribe().await?;
	Ok(ws.on_upgrade(move |socket| handle_ws_connection(socket, subscription)))
}

async fn handle_ws_connection(socket: WebSocket, mut subscription: Subscription) {
	let subscriber = subscription.id();
	info!(%subscriber, "update subscriber connected");

	let (mut sender, mut receiver) = socket.split();
	loop {
		tokio::select! {
			pulse = subscription.recv() => {
				if pulse.is_none() {
					debug!(%subscriber, "subscriber dropped by broadcaster");
					break;
				}
				if let Err(e) = sender.send(Message::Text(UPDATE_FRAME.into())).await {
					debug!(%subscriber, error = %e, "failed to send update");
					break;
				}
			}
			incoming = receiver.next() => {
				match incoming {
					Some(Ok(Message::Close(_))) | None => break,
					Some(Err(e)) => {
						debug!(%subscriber, error = %e, "WebSocket receive error");
						break;
					}
					Some(Ok(_)) => {}
				}
			}
		}
	}

	let _ = sender.close().await;
	info!(%subscriber, "update subscriber disconnected");
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use axum::http::StatusCode;
	use futures::StreamExt;
	use tokio_tungstenite::{connect_async, tungstenite};

	use crate::api::{create_router, AppState};
	use crate::testing::{utc, Harness};

	async fn serve(h: &Harness) -> String {
		let app = create_router(AppState::new(h.state.clone()), "/stopwatch");
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});
		format!("ws://{addr}/stopwatch/updates")
	}

	async fn wait_for_subscribers(h: &Harness, expected: usize) {
		tokio::time::timeout(Duration::from_secs(5), async {
			while h.updates.subscriber_count().await.unwrap() != expected {
				tokio::time::sleep(Duration::from_millis(10)).await;
			}
		})
		.await
		.expect("subscriber count did not settle");
	}

	#[tokio::test]
	async fn test_state_change_sends_update_frame() {
		let h = Harness::new(utc(2026, 3, 10, 9, 0)).await;
		let url = serve(&h).await;

		let (mut socket, _) = connect_async(url.as_str()).await.unwrap();
		wait_for_subscribers(&h, 1).await;

		h.state.start().await.unwrap();
		let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
			.await
			.expect("no frame received")
			.unwrap()
			.unwrap();
		assert_eq!(frame, tungstenite::Message::Text("update".to_string()));

		h.clock.advance(chrono::Duration::seconds(1));
		h.state.stop().await.unwrap();
		let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
			.await
			.expect("no frame received")
			.unwrap()
			.unwrap();
		assert_eq!(frame, tungstenite::Message::Text("update".to_string()));
	}

	#[tokio::test]
	async fn test_closed_socket_unregisters_subscriber() {
		let h = Harness::new(utc(2026, 3, 10, 9, 0)).await;
		let url = serve(&h).await;

		let (mut socket, _) = connect_async(url.as_str()).await.unwrap();
		wait_for_subscribers(&h, 1).await;

		socket.close(None).await.unwrap();
		wait_for_subscribers(&h, 0).await;
	}

	#[tokio::test]
	async fn test_stopped_broadcaster_rejects_upgrade() {
		let h = Harness::new(utc(2026, 3, 10, 9, 0)).await;
		let url = serve(&h).await;
		h.stop_broadcaster();

		match connect_async(url.as_str()).await {
			Err(tungstenite::Error::Http(response)) => {
				assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
			}
			Err(e) => panic!("unexpected error: {e}"),
			Ok(_) => panic!("upgrade succeeded with the broadcaster stopped"),
		}
	}
}
