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

use std::sync::Mutex;

use dashmap::DashMap;
use tracing::warn;

use super::{LedgerError, PurchaseLedger, StockLedger};
use crate::types::{PurchaseRecord, StockEntry};

/// In-memory implementation of the Stock Ledger
///
/// Characteristics:
/// - Each ingredient's update is atomic (one map entry at a time)
/// - No durability; stock lives for the process lifetime
/// - A multi-ingredient commit is not transactional across entries
///
/// Future evolution paths:
/// - Back with a document store keyed by ingredient name
/// - Add a conditional decrement to close the cross-order planning race
pub struct MemoryStockLedger {
	stock: DashMap<String, u64>,
}

impl MemoryStockLedger {
	pub fn new() -> Self {
		Self {
			stock: DashMap::new(),
		}
	}
}

impl Default for MemoryStockLedger {
	fn default() -> Self {
		Self::new()
	}
}

impl StockLedger for MemoryStockLedger {
	fn get(&self, name: &str) -> Result<u64, LedgerError> {
		Ok(self.stock.get(name).map(|entry| *entry).unwrap_or(0))
	}

	fn decrement(&self, name: &str, amount: u64) -> Result<(), LedgerError> {
		let mut entry = self.stock.entry(name.to_string()).or_insert(0);
		let current = *entry;
		if amount > current {
			// Concurrent orders planning against the same snapshot can
			// over-commit an ingredient; the stored quantity clamps at zero
			warn!(
				ingredient = name,
				stock = current,
				amount,
				"Decrement exceeds available stock; clamping at zero"
			);
		}
		*entry = current.saturating_sub(amount);
		Ok(())
	}

	fn seed(&self, entries: &[StockEntry]) -> Result<(), LedgerError> {
		for entry in entries {
			self.stock.insert(entry.name.clone(), entry.stock);
		}
		Ok(())
	}

	fn is_empty(&self) -> Result<bool, LedgerError> {
		Ok(self.stock.is_empty())
	}

	fn entries(&self) -> Result<Vec<StockEntry>, LedgerError> {
		let mut entries: Vec<StockEntry> = self
			.stock
			.iter()
			.map(|entry| StockEntry {
				name: entry.key().clone(),
				stock: *entry.value(),
			})
			.collect();
		entries.sort_by(|a, b| a.name.cmp(&b.name));
		Ok(entries)
	}
}

/// In-memory implementation of the Purchase Ledger
pub struct MemoryPurchaseLedger {
	records: Mutex<Vec<PurchaseRecord>>,
}

impl MemoryPurchaseLedger {
	pub fn new() -> Self {
		Self {
			records: Mutex::new(Vec::new()),
		}
	}
}

impl Default for MemoryPurchaseLedger {
	fn default() -> Self {
		Self::new()
	}
}

impl PurchaseLedger for MemoryPurchaseLedger {
	fn append(&self, record: PurchaseRecord) -> Result<(), LedgerError> {
		self.records
			.lock()
			.map_err(|e| LedgerError::Storage(e.to_string()))?
			.push(record);
		Ok(())
	}

	fn records(&self) -> Result<Vec<PurchaseRecord>, LedgerError> {
		Ok(self
			.records
			.lock()
			.map_err(|e| LedgerError::Storage(e.to_string()))?
			.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;

	#[test]
	fn test_absent_ingredient_reads_zero() {
		let ledger = MemoryStockLedger::new();
		assert_eq!(ledger.get("tomato").unwrap(), 0);
	}

	#[test]
	fn test_seed_and_get() {
		let ledger = MemoryStockLedger::new();
		assert!(ledger.is_empty().unwrap());

		ledger
			.seed(&[
				StockEntry {
					name: "tomato".to_string(),
					stock: 5,
				},
				StockEntry {
					name: "rice".to_string(),
					stock: 5,
				},
			])
			.unwrap();

		assert!(!ledger.is_empty().unwrap());
		assert_eq!(ledger.get("tomato").unwrap(), 5);
		assert_eq!(ledger.get("rice").unwrap(), 5);
	}

	#[test]
	fn test_decrement() {
		let ledger = MemoryStockLedger::new();
		ledger
			.seed(&[StockEntry {
				name: "tomato".to_string(),
				stock: 5,
			}])
			.unwrap();

		ledger.decrement("tomato", 3).unwrap();
		assert_eq!(ledger.get("tomato").unwrap(), 2);

		ledger.decrement("tomato", 2).unwrap();
		assert_eq!(ledger.get("tomato").unwrap(), 0);
	}

	#[test]
	fn test_decrement_past_stock_clamps_at_zero() {
		let ledger = MemoryStockLedger::new();
		ledger
			.seed(&[StockEntry {
				name: "tomato".to_string(),
				stock: 2,
			}])
			.unwrap();

		// Over-committed by a racing order: clamps, never wraps or panics
		ledger.decrement("tomato", 3).unwrap();
		assert_eq!(ledger.get("tomato").unwrap(), 0);
	}

	#[test]
	fn test_entries_listing() {
		let ledger = MemoryStockLedger::new();
		ledger
			.seed(&[
				StockEntry {
					name: "rice".to_string(),
					stock: 5,
				},
				StockEntry {
					name: "cheese".to_string(),
					stock: 3,
				},
			])
			.unwrap();

		let entries = ledger.entries().unwrap();
		assert_eq!(entries.len(), 2);
		assert_eq!(entries[0].name, "cheese");
		assert_eq!(entries[1].name, "rice");
	}

	#[test]
	fn test_purchase_records_in_append_order() {
		let ledger = MemoryPurchaseLedger::new();
		for (ingredient, quantity) in [("tomato", 3), ("rice", 1)] {
			ledger
				.append(PurchaseRecord {
					ingredient: ingredient.to_string(),
					quantity,
					date: Utc::now(),
					order_id: "O1".to_string(),
				})
				.unwrap();
		}

		let records = ledger.records().unwrap();
		assert_eq!(records.len(), 2);
		assert_eq!(records[0].ingredient, "tomato");
		assert_eq!(records[1].ingredient, "rice");
		assert!(records.iter().all(|r| r.order_id == "O1"));
	}
}
