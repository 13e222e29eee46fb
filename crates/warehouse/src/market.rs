// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! RPC-over-queues client for the external market supplier
//!
//! The client owns two logical channels: the shared outbound request queue
//! and a process-private reply queue declared once at startup. Each purchase
//! is a one-shot correlated exchange: register a completion handle, publish
//! the request tagged with a fresh correlation identifier and the reply
//! queue's address, then suspend until the reply consumer fires the handle.
//!
//! There is deliberately no timeout on the await: if the market never
//! answers, the calling order stays suspended and is never committed.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info};

use bodega_broker::{BrokerError, MemoryBroker, MessageProperties};

use crate::ledger::{LedgerError, PurchaseLedger};
use crate::types::{MarketPurchaseRequest, PurchaseRecord};

/// Error types for market client operations
#[derive(Debug, Error)]
pub enum MarketError {
	#[error("Broker error: {0}")]
	Broker(#[from] BrokerError),
	#[error("Failed to encode purchase request: {0}")]
	Encode(#[from] serde_json::Error),
	#[error("Reply consumer stopped before purchase completed")]
	ReplyChannelClosed,
	#[error(transparent)]
	Ledger(#[from] LedgerError),
}

/// Client for the market supplier's request/reply exchange
///
/// Cheap to clone; all clones share the pending-completion registry and the
/// private reply queue. The registry is scoped to the client's lifetime
/// rather than held globally, keyed by correlation identifier, with entries
/// removed on match.
#[derive(Clone)]
pub struct MarketClient {
	broker: Arc<MemoryBroker>,
	request_queue: String,
	reply_queue: String,
	pending: Arc<DashMap<String, oneshot::Sender<()>>>,
	purchases: Arc<dyn PurchaseLedger>,
}

impl MarketClient {
	/// Create the client and start its reply-consumer task
	///
	/// Declares the shared request queue and an exclusive reply queue, then
	/// spawns the consumer that routes every inbound reply to the pending
	/// completion matching its correlation identifier. Replies with an
	/// unknown or already-resolved identifier are dropped; every reply is
	/// acknowledged regardless of match outcome, as no redelivery is wanted
	/// for them.
	pub fn start(
		broker: Arc<MemoryBroker>,
		request_queue: &str,
		purchases: Arc<dyn PurchaseLedger>,
	) -> Result<Self, MarketError> {
		broker.declare_queue(request_queue);
		let reply_queue = broker.declare_reply_queue();
		let mut consumer = broker.consume(&reply_queue)?;

		let pending: Arc<DashMap<String, oneshot::Sender<()>>> = Arc::new(DashMap::new());
		let pending_for_consumer = pending.clone();

		tokio::spawn(async move {
			while let Some(delivery) = consumer.next().await {
				match delivery.properties().correlation_id.as_deref() {
					Some(correlation_id) => {
						if let Some((_, completion)) = pending_for_consumer.remove(correlation_id) {
							// The purchase call may have been dropped; a dead
							// receiver is not an error here
							let _ = completion.send(());
						} else {
							debug!(
								correlation_id,
								"Dropping market reply with no pending purchase"
							);
						}
					}
					None => {
						debug!("Dropping market reply without correlation identifier");
					}
				}
				delivery.ack();
			}
		});

		Ok(Self {
			broker,
			request_queue: request_queue.to_string(),
			reply_queue,
			pending,
			purchases,
		})
	}

	/// Buy a quantity of one ingredient, completing when the market confirms
	///
	/// Suspends the calling task without blocking other in-flight orders.
	/// On completion, appends exactly one purchase record before returning.
	pub async fn purchase(
		&self,
		order_id: &str,
		ingredient: &str,
		quantity: u64,
	) -> Result<(), MarketError> {
		info!(
			order_id,
			ingredient, quantity, "Requesting purchase from market"
		);

		let correlation_id = uuid::Uuid::new_v4().to_string();
		let (completion, completed) = oneshot::channel();

		// Registered before publishing, so a reply racing the send still
		// finds its pending entry
		self.pending.insert(correlation_id.clone(), completion);

		let request = MarketPurchaseRequest {
			order_id: order_id.to_string(),
			ingredient: ingredient.to_string(),
			quantity,
		};
		let payload = serde_json::to_vec(&request)?;
		let properties = MessageProperties {
			correlation_id: Some(correlation_id.clone()),
			reply_to: Some(self.reply_queue.clone()),
		};

		if let Err(e) = self.broker.publish(&self.request_queue, payload, properties) {
			self.pending.remove(&correlation_id);
			return Err(e.into());
		}

		// No timeout: an unanswered request suspends this order indefinitely
		completed
			.await
			.map_err(|_| MarketError::ReplyChannelClosed)?;

		self.purchases.append(PurchaseRecord {
			ingredient: ingredient.to_string(),
			quantity,
			date: Utc::now(),
			order_id: order_id.to_string(),
		})?;

		info!(order_id, ingredient, quantity, "Purchase completed");
		Ok(())
	}

	/// Name of the process-private reply queue
	pub fn reply_queue(&self) -> &str {
		&self.reply_queue
	}

	/// Number of purchases still awaiting a market reply
	pub fn pending_count(&self) -> usize {
		self.pending.len()
	}
}
