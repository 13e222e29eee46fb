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

use tracing::info;

use crate::ledger::{LedgerError, StockLedger};
use crate::types::StockEntry;

/// Inventory the warehouse starts with on first boot
pub const INITIAL_STOCK: &[(&str, u64)] = &[
	("tomato", 5),
	("lemon", 5),
	("potato", 5),
	("rice", 5),
	("ketchup", 5),
	("lettuce", 5),
	("onion", 5),
	("cheese", 5),
	("meat", 5),
	("chicken", 5),
];

/// Seed the stock ledger with the initial inventory if it is empty
///
/// Gating on emptiness makes the call idempotent across restarts once the
/// ledger is durable. Returns whether seeding happened.
pub fn seed_initial_stock(ledger: &dyn StockLedger) -> Result<bool, LedgerError> {
	if !ledger.is_empty()? {
		return Ok(false);
	}

	let entries: Vec<StockEntry> = INITIAL_STOCK
		.iter()
		.map(|(name, stock)| StockEntry {
			name: name.to_string(),
			stock: *stock,
		})
		.collect();
	ledger.seed(&entries)?;

	info!(entries = entries.len(), "Seeded initial warehouse inventory");
	Ok(true)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ledger::MemoryStockLedger;

	#[test]
	fn test_seeds_empty_ledger() {
		let ledger = MemoryStockLedger::new();

		assert!(seed_initial_stock(&ledger).unwrap());
		assert_eq!(ledger.entries().unwrap().len(), INITIAL_STOCK.len());
		assert_eq!(ledger.get("tomato").unwrap(), 5);
	}

	#[test]
	fn test_skips_populated_ledger() {
		let ledger = MemoryStockLedger::new();
		ledger
			.seed(&[StockEntry {
				name: "tomato".to_string(),
				stock: 1,
			}])
			.unwrap();

		assert!(!seed_initial_stock(&ledger).unwrap());
		// Existing stock is left untouched
		assert_eq!(ledger.get("tomato").unwrap(), 1);
		assert_eq!(ledger.entries().unwrap().len(), 1);
	}
}
