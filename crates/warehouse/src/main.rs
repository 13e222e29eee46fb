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

//! Warehouse coordinator service entry point
//!
//! This binary wires up all components of the coordinator:
//! - Broker (queue transport)
//! - Stock Ledger and Purchase Ledger (memory-backed)
//! - Initial stock seeding (gated on an empty ledger)
//! - Market RPC Client (private reply queue + pending-completion registry)
//! - Reservation Engine (plan / acquire / commit / reply)
//! - Demand Listener (ingredient-demand queue ingress)

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;

use bodega_broker::MemoryBroker;
use bodega_warehouse::{
	MarketClient, MemoryPurchaseLedger, MemoryStockLedger, RequestListener, ReservationEngine,
	StockLedger, config::WarehouseConfig, logging, seed_initial_stock,
};

#[tokio::main]
async fn main() -> Result<()> {
	// Initialize logging first
	logging::init_logging()?;

	// Load configuration
	let config = WarehouseConfig::from_env().unwrap_or_else(|_| {
		info!(target: "server", "Using default configuration");
		WarehouseConfig::default()
	});

	info!(target: "server", "Starting Bodega Warehouse Coordinator");
	info!(target: "server", "Ingredient queue: {}", config.ingredient_queue);
	info!(target: "server", "Market request queue: {}", config.market_request_queue);

	// Phase 1: Broker
	info!(target: "server", "Creating broker...");
	let broker = Arc::new(MemoryBroker::new());

	// Phase 2: Ledgers
	info!(target: "server", "Initializing ledgers...");
	let stock: Arc<dyn StockLedger> = Arc::new(MemoryStockLedger::new());
	let purchases = Arc::new(MemoryPurchaseLedger::new());

	// Phase 3: Seed initial stock (only when the ledger is empty)
	if seed_initial_stock(stock.as_ref()).context("Failed to seed initial stock")? {
		info!(target: "server", "Initial inventory seeded");
	}

	// Phase 4: Market RPC client (declares its private reply queue)
	info!(target: "server", "Starting market client...");
	let market = MarketClient::start(broker.clone(), &config.market_request_queue, purchases)
		.context("Failed to start market client")?;

	// Phase 5: Reservation engine
	let engine = ReservationEngine::new(broker.clone(), stock, market);

	// Phase 6: Demand listener
	info!(target: "server", "Starting demand listener...");
	let listener = RequestListener::new(broker, &config.ingredient_queue, engine);
	let listener_future = listener.run();

	// Wait for shutdown signal
	tokio::select! {
		result = listener_future => {
			result.context("Demand listener error")?;
			info!(target: "server", "Demand listener stopped");
		}
		_ = signal::ctrl_c() => {
			info!(target: "server", "Shutting down...");
		}
	}

	info!(target: "server", "Shutdown complete");
	Ok(())
}
