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

//! Order reservation engine - the core of the warehouse coordinator
//!
//! Turns one inbound order demand into a committed ledger mutation and
//! exactly one readiness reply, in four phases:
//!
//! 1. Plan: read-only split of each demand into reserved-from-stock and
//!    to-buy quantities
//! 2. Acquire: sequential market purchases for every shortfall, in request
//!    order
//! 3. Commit: ledger decrements, only after every purchase completed
//! 4. Reply: readiness message to the requester's reply address
//!
//! Stock is decremented only in the commit phase, so an order whose
//! purchases stall or fail never consumes reserved stock. Any failure along
//! the way is logged and the order dropped without a reply; the inbound
//! delivery is acknowledged either way, after processing completes.
//!
//! Concurrent orders interleave at the market awaits. The plan phase reads
//! a point-in-time snapshot with no lock held through commit, so two orders
//! racing on the same scarce ingredient can both plan against it; that gap
//! is documented, accepted behavior.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use bodega_broker::{BrokerError, Delivery, MemoryBroker, MessageProperties};

use crate::ledger::{LedgerError, StockLedger};
use crate::market::{MarketClient, MarketError};
use crate::types::{IngredientDemand, OrderDemand, PlanEntry, ReadinessReply};

/// Error types for reservation processing
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Malformed order demand: {0}")]
	Decode(#[from] serde_json::Error),
	#[error("Failed to encode readiness reply: {0}")]
	EncodeReply(serde_json::Error),
	#[error("Demand carries no reply address")]
	MissingReplyAddress,
	#[error(transparent)]
	Ledger(#[from] LedgerError),
	#[error(transparent)]
	Market(#[from] MarketError),
	#[error("Failed to publish readiness reply: {0}")]
	Reply(#[from] BrokerError),
}

/// Reservation engine shared by all in-flight orders
///
/// Cheap to clone; the listener hands one clone to each spawned order task.
#[derive(Clone)]
pub struct ReservationEngine {
	broker: Arc<MemoryBroker>,
	stock: Arc<dyn StockLedger>,
	market: MarketClient,
}

impl ReservationEngine {
	pub fn new(
		broker: Arc<MemoryBroker>,
		stock: Arc<dyn StockLedger>,
		market: MarketClient,
	) -> Self {
		Self {
			broker,
			stock,
			market,
		}
	}

	/// Process one inbound demand delivery end to end, then acknowledge it
	///
	/// A failed order is logged and dropped without a reply; the requester's
	/// only failure signal is that no readiness message arrives.
	pub async fn handle_delivery(&self, delivery: Delivery) {
		match self.process(&delivery).await {
			Ok(order_id) => {
				info!(order_id = %order_id, "Order ingredients reserved and confirmed");
			}
			Err(e) => {
				error!(error = %e, "Failed to process ingredient demand; order dropped");
			}
		}
		delivery.ack();
	}

	async fn process(&self, delivery: &Delivery) -> Result<String, EngineError> {
		let demand: OrderDemand = serde_json::from_slice(delivery.payload())?;
		info!(
			order_id = %demand.order_id,
			ingredients = demand.ingredients.len(),
			"Received ingredient demand"
		);

		// Phase 1: plan (read-only)
		let plan = self.plan(&demand.ingredients)?;

		// Phase 2: acquire shortfalls, one ingredient at a time
		self.acquire(&demand.order_id, &plan).await?;

		// Phase 3: commit ledger decrements
		self.commit(&demand.order_id, &plan)?;

		// Phase 4: readiness reply to the original requester
		self.reply(&demand.order_id, delivery.properties())?;

		Ok(demand.order_id)
	}

	/// Split each demanded quantity into reserved stock and market shortfall
	///
	/// Reads current stock without mutating anything, so concurrent orders
	/// observe a consistent (if possibly stale) snapshot.
	fn plan(&self, ingredients: &[IngredientDemand]) -> Result<Vec<PlanEntry>, EngineError> {
		let mut plan = Vec::with_capacity(ingredients.len());
		for item in ingredients {
			let stock = self.stock.get(&item.name)?;
			let from_stock = stock.min(item.quantity);
			let entry = PlanEntry {
				name: item.name.clone(),
				from_stock,
				to_buy: item.quantity - from_stock,
			};
			if entry.to_buy > 0 {
				info!(
					ingredient = %entry.name,
					stock,
					demanded = item.quantity,
					to_buy = entry.to_buy,
					"Stock insufficient; shortfall goes to market"
				);
			}
			plan.push(entry);
		}
		Ok(plan)
	}

	/// Purchase every shortfall from the market, sequentially
	///
	/// Purchases within one order are not parallelized; each must complete
	/// before the next starts. Other orders proceed independently while this
	/// one is suspended.
	async fn acquire(&self, order_id: &str, plan: &[PlanEntry]) -> Result<(), EngineError> {
		for entry in plan.iter().filter(|entry| entry.to_buy > 0) {
			self.market
				.purchase(order_id, &entry.name, entry.to_buy)
				.await?;
		}
		Ok(())
	}

	/// Decrement the ledger for every plan entry
	///
	/// Runs only after all purchases completed. Purchased units are consumed
	/// on arrival and never enter the ledger, so the stored decrement per
	/// ingredient is the quantity reserved from stock in the plan phase.
	fn commit(&self, order_id: &str, plan: &[PlanEntry]) -> Result<(), EngineError> {
		for entry in plan {
			if entry.from_stock > 0 {
				self.stock.decrement(&entry.name, entry.from_stock)?;
			}
			info!(
				order_id,
				ingredient = %entry.name,
				from_stock = entry.from_stock,
				purchased = entry.to_buy,
				"Committed reservation"
			);
		}
		Ok(())
	}

	fn reply(&self, order_id: &str, properties: &MessageProperties) -> Result<(), EngineError> {
		let reply_to = properties
			.reply_to
			.as_deref()
			.ok_or(EngineError::MissingReplyAddress)?;

		let reply = ReadinessReply::ready(order_id);
		let payload = serde_json::to_vec(&reply).map_err(EngineError::EncodeReply)?;
		self.broker.publish(
			reply_to,
			payload,
			MessageProperties {
				correlation_id: properties.correlation_id.clone(),
				reply_to: None,
			},
		)?;

		info!(order_id, reply_to, "Sent readiness confirmation");
		Ok(())
	}
}
