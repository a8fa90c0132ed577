// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Update fan-out to live subscribers.
//!
//! A single coordinator task owns the subscriber table. Handles talk to it
//! over an unbounded command channel, so [`UpdateBroadcaster::publish`] never
//! waits on the coordinator or on any subscriber.
//!
//! ```text
//!   publish() ──┐
//!   register() ─┼──> Command queue ──> Coordinator ──try_send──> sink 1
//!   unregister()┘                       (HashMap)    ──try_send──> sink 2
//!                                                    ──try_send──> sink N
//! ```
//!
//! Every sink holds at most one pending pulse. A sink that cannot take a pulse
//! immediately, because it is full or its receiver is gone, is removed and
//! dropped, which closes it for the receiver.

use std::collections::HashMap;
use std::fmt;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use crate::error::BroadcastError;

/// Content-free "state changed, re-fetch" notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse;

/// Opaque handle identifying a registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "sub-{}", self.0)
	}
}

enum Command {
	Register {
		sink: mpsc::Sender<Pulse>,
		reply: oneshot::Sender<SubscriberId>,
	},
	Unregister(SubscriberId),
	Publish,
	Count {
		reply: oneshot::Sender<usize>,
	},
}

/// Cloneable handle to the coordinator task.
#[derive(Clone)]
pub struct UpdateBroadcaster {
	tx: mpsc::UnboundedSender<Command>,
}

impl UpdateBroadcaster {
	/// Start the coordinator. It runs until `shutdown` flips to `true` or every
	/// handle is dropped; all remaining sinks are closed on exit.
	pub fn spawn(shutdown: watch::Receiver<bool>) -> (Self, JoinHandle<()>) {
		let (tx, rx) = mpsc::unbounded_channel();
		let handle = tokio::spawn(Coordinator::default().run(rx, shutdown));
		(Self { tx }, handle)
	}

	/// Add a sink. The caller keeps the receiving half.
	pub async fn register(&self, sink: mpsc::Sender<Pulse>) -> Result<SubscriberId, BroadcastError> {
		let (reply, rx) = oneshot::channel();
		self
			.tx
			.send(Command::Register { sink, reply })
			.map_err(|_| BroadcastError::Closed)?;
		rx.await.map_err(|_| BroadcastError::Closed)
	}

	/// Remove a subscriber and close its sink. Unknown ids are ignored.
	pub fn unregister(&self, id: SubscriberId) {
		if self.tx.send(Command::Unregister(id)).is_err() {
			trace!(subscriber = %id, "broadcaster stopped before unregister");
		}
	}

	/// Notify every subscriber. Never blocks.
	pub fn publish(&self) {
		if self.tx.send(Command::Publish).is_err() {
			debug!("broadcaster stopped, dropping pulse");
		}
	}

	pub async fn subscriber_count(&self) -> Result<usize, BroadcastError> {
		let (reply, rx) = oneshot::channel();
		self
			.tx
			.send(Command::Count { reply })
			.map_err(|_| BroadcastError::Closed)?;
		rx.await.map_err(|_| BroadcastError::Closed)
	}

	/// Register a fresh single-slot sink and return its receiving side.
	/// The subscriber is unregistered when the [`Subscription`] is dropped.
	pub async fn subscribe(&self) -> Result<Subscription, BroadcastError> {
		let (sink, rx) = mpsc::channel(1);
		let id = self.register(sink).await?;
		Ok(Subscription {
			id,
			rx,
			broadcaster: self.clone(),
		})
	}
}

/// Receiving end of a registered subscriber.
pub struct Subscription {
	id: SubscriberId,
	rx: mpsc::Receiver<Pulse>,
	broadcaster: UpdateBroadcaster,
}

impl Subscription {
	pub fn id(&self) -> SubscriberId {
		self.id
	}

	/// Wait for the next pulse. `None` once the sink has been closed.
	pub async fn recv(&mut self) -> Option<Pulse> {
		self.rx.recv().await
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.broadcaster.unregister(self.id);
	}
}

#[derive(Default)]
struct Coordinator {
	subscribers: HashMap<SubscriberId, mpsc::Sender<Pulse>>,
	next_id: u64,
}

impl Coordinator {
	async fn run(
		mut self,
		mut rx: mpsc::UnboundedReceiver<Command>,
		mut shutdown: watch::Receiver<bool>,
	) {
		info!("update broadcaster started");
		loop {
			tokio::select! {
				biased;

				changed = shutdown.changed() => {
					if changed.is_err() || *shutdown.borrow() {
						info!("shutdown signal received");
						break;
					}
				}

				command = rx.recv() => {
					match command {
						Some(command) => self.handle(command),
						None => break,
					}
				}
			}
		}

		let remaining = self.subscribers.len();
		self.subscribers.clear();
		info!(remaining, "update broadcaster stopped");
	}

	fn handle(&mut self, command: Command) {
		match command {
			Command::Register { sink, reply } => {
				let id = SubscriberId(self.next_id);
				self.next_id += 1;
				self.subscribers.insert(id, sink);
				debug!(subscriber = %id, total = self.subscribers.len(), "subscriber registered");
				// Requester gone: the entry is removed on the next failed delivery.
				let _ = reply.send(id);
			}
			Command::Unregister(id) => {
				if self.subscribers.remove(&id).is_some() {
					debug!(subscriber = %id, total = self.subscribers.len(), "subscriber unregistered");
				}
			}
			Command::Publish => self.publish(),
			Command::Count { reply } => {
				let _ = reply.send(self.subscribers.len());
			}
		}
	}

	fn publish(&mut self) {
		let before = self.subscribers.len();
		self.subscribers.retain(|id, sink| match sink.try_send(Pulse) {
			Ok(()) => true,
			Err(e) => {
				debug!(subscriber = %id, error = %e, "dropping subscriber");
				false
			}
		});
		trace!(
			delivered = self.subscribers.len(),
			dropped = before - self.subscribers.len(),
			"pulse published"
		);
	}
}
