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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ingredient line on an inbound order demand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientDemand {
	pub name: String,
	pub quantity: u64,
}

/// Inbound request to reserve the ingredients for one order
///
/// Delivered with broker-level reply-address and correlation-identifier
/// properties that route the eventual readiness reply; the payload itself
/// carries only the order and its demanded quantities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDemand {
	pub order_id: String,
	pub ingredients: Vec<IngredientDemand>,
}

/// Outbound confirmation that an order's ingredients are reserved
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessReply {
	pub status: String,
	pub order_id: String,
}

impl ReadinessReply {
	pub fn ready(order_id: &str) -> Self {
		Self {
			status: "ready".to_string(),
			order_id: order_id.to_string(),
		}
	}
}

/// Outbound request for the external market supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPurchaseRequest {
	pub order_id: String,
	pub ingredient: String,
	pub quantity: u64,
}

/// On-hand quantity of a single ingredient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
	pub name: String,
	pub stock: u64,
}

/// Audit record of one completed external purchase
///
/// Appended exactly once per completed purchase and never read back by the
/// reservation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
	pub ingredient: String,
	pub quantity: u64,
	pub date: DateTime<Utc>,
	pub order_id: String,
}

/// Per-ingredient split between reserved stock and external purchase
///
/// Derived afresh for each order during the plan phase and discarded once
/// the order is fully processed. `from_stock + to_buy` always equals the
/// demanded quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
	pub name: String,
	pub from_stock: u64,
	pub to_buy: u64,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_order_demand_wire_format() {
		let json = r#"{"orderId":"O1","ingredients":[{"name":"tomato","quantity":3}]}"#;
		let demand: OrderDemand = serde_json::from_str(json).unwrap();

		assert_eq!(demand.order_id, "O1");
		assert_eq!(demand.ingredients.len(), 1);
		assert_eq!(demand.ingredients[0].name, "tomato");
		assert_eq!(demand.ingredients[0].quantity, 3);
	}

	#[test]
	fn test_readiness_reply_wire_format() {
		let reply = ReadinessReply::ready("O1");
		let json = serde_json::to_value(&reply).unwrap();

		assert_eq!(json["status"], "ready");
		assert_eq!(json["orderId"], "O1");
	}

	#[test]
	fn test_market_request_wire_format() {
		let request = MarketPurchaseRequest {
			order_id: "O1".to_string(),
			ingredient: "tomato".to_string(),
			quantity: 3,
		};
		let json = serde_json::to_value(&request).unwrap();

		assert_eq!(json["orderId"], "O1");
		assert_eq!(json["ingredient"], "tomato");
		assert_eq!(json["quantity"], 3);
	}
}
