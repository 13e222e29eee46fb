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

//! In-process message broker for the Bodega services
//!
//! This crate provides the queueing contract the warehouse coordinator is
//! written against: named queues, per-message reply-address and
//! correlation-identifier properties, exclusive reply queues, and explicit
//! per-delivery acknowledgement.
//!
//! Properties:
//! - Multiple Producers per queue (any holder of the broker handle)
//! - Single Consumer per queue (a second attach is an error)
//! - Deliveries arrive in publish order
//! - Unbounded capacity; publish never blocks
//!
//! The broker does NOT:
//! - Redeliver unacknowledged messages
//! - Persist messages across process restarts
//! - Route beyond direct queue names
//!
//! Unacknowledged deliveries are counted per queue so callers (and tests)
//! can verify that every consumed message was acknowledged.

use std::sync::{
	Arc, Mutex,
	atomic::{AtomicUsize, Ordering},
};

use dashmap::DashMap;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

/// Errors that can occur when interacting with the broker
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
	#[error("Unknown queue: {0}")]
	UnknownQueue(String),
	#[error("Queue already has a consumer: {0}")]
	ConsumerAttached(String),
	#[error("Queue closed: {0}")]
	Closed(String),
}

/// Broker-level metadata carried alongside a message payload
///
/// `reply_to` names the queue the receiver should answer on; `correlation_id`
/// binds that answer back to the request that caused it.
#[derive(Debug, Clone, Default)]
pub struct MessageProperties {
	pub correlation_id: Option<String>,
	pub reply_to: Option<String>,
}

/// A message handed to a consumer
///
/// The delivery must be acknowledged exactly once via [`Delivery::ack`].
/// Dropping a delivery without acknowledging it leaves it counted as
/// outstanding on its queue.
#[derive(Debug)]
pub struct Delivery {
	payload: Vec<u8>,
	properties: MessageProperties,
	unacked: Arc<AtomicUsize>,
}

impl Delivery {
	pub fn payload(&self) -> &[u8] {
		&self.payload
	}

	pub fn properties(&self) -> &MessageProperties {
		&self.properties
	}

	/// Acknowledge the delivery, consuming it
	pub fn ack(self) {
		self.unacked.fetch_sub(1, Ordering::Relaxed);
	}
}

/// Consumer end of a queue
///
/// Held exclusively; deliveries are yielded in publish order.
pub struct Consumer {
	receiver: UnboundedReceiver<Delivery>,
}

impl Consumer {
	/// Receive the next delivery, suspending until one is available
	///
	/// Returns `None` once the queue can produce no further deliveries.
	pub async fn next(&mut self) -> Option<Delivery> {
		self.receiver.recv().await
	}
}

struct Queue {
	sender: UnboundedSender<Delivery>,
	receiver: Mutex<Option<UnboundedReceiver<Delivery>>>,
	unacked: Arc<AtomicUsize>,
	exclusive: bool,
}

impl Queue {
	fn new(exclusive: bool) -> Self {
		let (sender, receiver) = unbounded_channel();
		Self {
			sender,
			receiver: Mutex::new(Some(receiver)),
			unacked: Arc::new(AtomicUsize::new(0)),
			exclusive,
		}
	}
}

/// In-memory broker backing all queue traffic inside one process
///
/// Shared via `Arc` between every component that publishes or consumes.
/// Queue declaration is idempotent, matching the assert-then-use pattern
/// the services follow at startup.
pub struct MemoryBroker {
	queues: DashMap<String, Queue>,
}

impl MemoryBroker {
	pub fn new() -> Self {
		Self {
			queues: DashMap::new(),
		}
	}

	/// Declare a named queue, creating it if absent
	pub fn declare_queue(&self, name: &str) {
		self.queues
			.entry(name.to_string())
			.or_insert_with(|| Queue::new(false));
	}

	/// Declare a process-private reply queue with a generated unique name
	///
	/// The returned name is what callers place in `reply_to` when they want
	/// answers routed back to this process.
	pub fn declare_reply_queue(&self) -> String {
		let name = format!("reply.{}", uuid::Uuid::new_v4());
		self.queues.insert(name.clone(), Queue::new(true));
		debug!(queue = %name, "Declared exclusive reply queue");
		name
	}

	/// Publish a message to a declared queue
	pub fn publish(
		&self,
		queue: &str,
		payload: Vec<u8>,
		properties: MessageProperties,
	) -> Result<(), BrokerError> {
		let entry = self
			.queues
			.get(queue)
			.ok_or_else(|| BrokerError::UnknownQueue(queue.to_string()))?;

		entry.unacked.fetch_add(1, Ordering::Relaxed);
		let delivery = Delivery {
			payload,
			properties,
			unacked: entry.unacked.clone(),
		};
		entry.sender.send(delivery).map_err(|_| {
			entry.unacked.fetch_sub(1, Ordering::Relaxed);
			BrokerError::Closed(queue.to_string())
		})
	}

	/// Attach the single consumer of a queue
	///
	/// The consumer end can be taken exactly once; queues are single-consumer
	/// by contract and exclusive reply queues doubly so.
	pub fn consume(&self, queue: &str) -> Result<Consumer, BrokerError> {
		let entry = self
			.queues
			.get(queue)
			.ok_or_else(|| BrokerError::UnknownQueue(queue.to_string()))?;

		let receiver = entry
			.receiver
			.lock()
			.map_err(|_| BrokerError::Closed(queue.to_string()))?
			.take()
			.ok_or_else(|| BrokerError::ConsumerAttached(queue.to_string()))?;

		Ok(Consumer { receiver })
	}

	/// Number of published-but-unacknowledged messages on a queue
	pub fn unacked(&self, queue: &str) -> usize {
		self.queues
			.get(queue)
			.map(|q| q.unacked.load(Ordering::Relaxed))
			.unwrap_or(0)
	}

	/// Whether a queue was declared exclusively (as a private reply queue)
	pub fn is_exclusive(&self, queue: &str) -> bool {
		self.queues.get(queue).map(|q| q.exclusive).unwrap_or(false)
	}
}

impl Default for MemoryBroker {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_publish_and_consume_in_order() {
		let broker = MemoryBroker::new();
		broker.declare_queue("orders");

		broker
			.publish("orders", b"first".to_vec(), MessageProperties::default())
			.unwrap();
		broker
			.publish("orders", b"second".to_vec(), MessageProperties::default())
			.unwrap();

		let mut consumer = broker.consume("orders").unwrap();
		let first = consumer.next().await.unwrap();
		let second = consumer.next().await.unwrap();

		assert_eq!(first.payload(), b"first");
		assert_eq!(second.payload(), b"second");
	}

	#[tokio::test]
	async fn test_properties_travel_with_delivery() {
		let broker = MemoryBroker::new();
		broker.declare_queue("orders");

		let properties = MessageProperties {
			correlation_id: Some("corr-1".to_string()),
			reply_to: Some("replies".to_string()),
		};
		broker
			.publish("orders", b"payload".to_vec(), properties)
			.unwrap();

		let mut consumer = broker.consume("orders").unwrap();
		let delivery = consumer.next().await.unwrap();

		assert_eq!(
			delivery.properties().correlation_id.as_deref(),
			Some("corr-1")
		);
		assert_eq!(delivery.properties().reply_to.as_deref(), Some("replies"));
	}

	#[test]
	fn test_publish_to_unknown_queue() {
		let broker = MemoryBroker::new();

		let result = broker.publish("missing", Vec::new(), MessageProperties::default());
		assert!(matches!(result, Err(BrokerError::UnknownQueue(_))));
	}

	#[test]
	fn test_declare_queue_is_idempotent() {
		let broker = MemoryBroker::new();
		broker.declare_queue("orders");
		broker
			.publish("orders", b"kept".to_vec(), MessageProperties::default())
			.unwrap();

		// A second declaration must not replace the queue or lose messages
		broker.declare_queue("orders");
		assert_eq!(broker.unacked("orders"), 1);
	}

	#[test]
	fn test_single_consumer_per_queue() {
		let broker = MemoryBroker::new();
		broker.declare_queue("orders");

		let _consumer = broker.consume("orders").unwrap();
		let second = broker.consume("orders");
		assert!(matches!(second, Err(BrokerError::ConsumerAttached(_))));
	}

	#[test]
	fn test_reply_queue_names_are_unique() {
		let broker = MemoryBroker::new();
		let first = broker.declare_reply_queue();
		let second = broker.declare_reply_queue();

		assert_ne!(first, second);
		assert!(broker.is_exclusive(&first));
		assert!(!broker.is_exclusive("orders"));
	}

	#[tokio::test]
	async fn test_ack_accounting() {
		let broker = MemoryBroker::new();
		broker.declare_queue("orders");

		broker
			.publish("orders", b"one".to_vec(), MessageProperties::default())
			.unwrap();
		broker
			.publish("orders", b"two".to_vec(), MessageProperties::default())
			.unwrap();
		assert_eq!(broker.unacked("orders"), 2);

		let mut consumer = broker.consume("orders").unwrap();
		consumer.next().await.unwrap().ack();
		assert_eq!(broker.unacked("orders"), 1);

		consumer.next().await.unwrap().ack();
		assert_eq!(broker.unacked("orders"), 0);
	}
}
