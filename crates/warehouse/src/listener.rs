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

//! Inbound demand listener
//!
//! Thin dispatch layer between the ingredient-demand queue and the
//! reservation engine. It makes no business decisions: every delivery is
//! handed to the engine on its own task, so an order suspended on a market
//! purchase never holds up delivery of the next one. Acknowledgement belongs
//! to the engine and happens after its processing path completes, success or
//! caught failure - never before.

use std::sync::Arc;

use tracing::info;

use bodega_broker::{BrokerError, MemoryBroker};

use crate::engine::ReservationEngine;

/// Consumer of the ingredient-demand queue
pub struct RequestListener {
	broker: Arc<MemoryBroker>,
	queue: String,
	engine: ReservationEngine,
}

impl RequestListener {
	pub fn new(broker: Arc<MemoryBroker>, queue: &str, engine: ReservationEngine) -> Self {
		broker.declare_queue(queue);
		Self {
			broker,
			queue: queue.to_string(),
			engine,
		}
	}

	/// Consume demand deliveries until the queue closes
	///
	/// Orders are not serialized against one another; each delivery runs on
	/// its own task and in-flight orders overlap wherever the engine
	/// suspends.
	pub async fn run(self) -> Result<(), BrokerError> {
		let mut consumer = self.broker.consume(&self.queue)?;
		info!(queue = %self.queue, "Listening for ingredient demands");

		while let Some(delivery) = consumer.next().await {
			let engine = self.engine.clone();
			tokio::spawn(async move {
				engine.handle_delivery(delivery).await;
			});
		}

		info!(queue = %self.queue, "Demand queue closed; listener stopping");
		Ok(())
	}
}
