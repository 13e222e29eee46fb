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

//! Bodega Warehouse Coordinator
//!
//! This crate reserves ingredients for incoming orders, buys shortfalls from
//! an external market supplier, and confirms readiness to the requester.
//!
//! Architecture:
//! - Stock and purchase ledgers behind trait seams, memory-backed
//! - Market RPC client: correlated request/reply over a private reply queue
//! - Reservation engine: plan / acquire / commit / reply per order
//! - Demand listener: one task per delivery, in-flight orders overlap

pub mod config;
pub mod engine;
pub mod ledger;
pub mod listener;
pub mod logging;
pub mod market;
pub mod seed;
pub mod types;

pub use engine::{EngineError, ReservationEngine};
pub use ledger::{
	LedgerError, MemoryPurchaseLedger, MemoryStockLedger, PurchaseLedger, StockLedger,
};
pub use listener::RequestListener;
pub use market::{MarketClient, MarketError};
pub use seed::{INITIAL_STOCK, seed_initial_stock};
pub use types::*;
