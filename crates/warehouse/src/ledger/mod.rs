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

mod memory;

use thiserror::Error;

use crate::types::{PurchaseRecord, StockEntry};
pub use memory::{MemoryPurchaseLedger, MemoryStockLedger};

/// Error types for ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
	#[error("Ledger storage error: {0}")]
	Storage(String),
}

/// Stock Ledger trait - the single source of truth for on-hand stock
///
/// Key semantic constraints:
/// - Entries are keyed by ingredient name; absent entries read as zero
/// - `decrement` carries the caller precondition `amount <= current stock`;
///   the ledger does not police it, and stored stock can never go negative
/// - Entries are created by seeding and never deleted
///
/// This abstraction is implementation-agnostic: it can be backed by
/// in-memory structures or an external document store.
pub trait StockLedger: Send + Sync {
	/// Current stock for an ingredient, zero if absent
	fn get(&self, name: &str) -> Result<u64, LedgerError>;

	/// Decrement an ingredient's stock
	///
	/// Precondition: `amount` does not exceed the current stock. Violating
	/// it is a logic error in the caller; the stored quantity clamps at zero.
	fn decrement(&self, name: &str, amount: u64) -> Result<(), LedgerError>;

	/// Insert the given entries
	///
	/// Callers gate this on [`StockLedger::is_empty`]; it is only invoked
	/// once, at startup, when no stock exists yet.
	fn seed(&self, entries: &[StockEntry]) -> Result<(), LedgerError>;

	/// Whether the ledger holds no entries at all
	fn is_empty(&self) -> Result<bool, LedgerError>;

	/// Read-only listing of every stock entry
	fn entries(&self) -> Result<Vec<StockEntry>, LedgerError>;
}

/// Purchase Ledger trait - append-only audit trail of completed purchases
///
/// Records are written exactly once per completed external purchase and are
/// never read back by the reservation path; `records` exists for audit and
/// verification reads only.
pub trait PurchaseLedger: Send + Sync {
	/// Append one completed purchase
	fn append(&self, record: PurchaseRecord) -> Result<(), LedgerError>;

	/// All recorded purchases, in append order
	fn records(&self) -> Result<Vec<PurchaseRecord>, LedgerError>;
}
