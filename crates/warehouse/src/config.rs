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

use serde::{Deserialize, Serialize};

// Logging configuration constants
/// Default log level (can be overridden by RUST_LOG environment variable)
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log directory component name
pub const LOG_COMPONENT_NAME: &str = "warehouse";

/// Default console output enabled (can be overridden by LOG_TO_CONSOLE environment variable)
pub const DEFAULT_LOG_TO_CONSOLE: bool = false;

// Queue name constants
/// Default inbound ingredient-demand queue (can be overridden by WAREHOUSE_INGREDIENT_QUEUE)
pub const DEFAULT_INGREDIENT_QUEUE: &str = "ingredient_requests";

/// Default outbound market request queue (can be overridden by WAREHOUSE_MARKET_REQUEST_QUEUE)
pub const DEFAULT_MARKET_REQUEST_QUEUE: &str = "market_requests";

/// Warehouse coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
	/// Queue the coordinator consumes ingredient demands from
	pub ingredient_queue: String,
	/// Shared queue market purchase requests are published to
	pub market_request_queue: String,
}

impl Default for WarehouseConfig {
	fn default() -> Self {
		Self {
			ingredient_queue: DEFAULT_INGREDIENT_QUEUE.to_string(),
			market_request_queue: DEFAULT_MARKET_REQUEST_QUEUE.to_string(),
		}
	}
}

impl WarehouseConfig {
	/// Load configuration from environment variables
	pub fn from_env() -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder()
			.add_source(config::Environment::with_prefix("WAREHOUSE"))
			.build()?;

		cfg.try_deserialize()
	}

	/// Load configuration from file
	pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder()
			.add_source(config::File::with_name(path))
			.add_source(config::Environment::with_prefix("WAREHOUSE"))
			.build()?;

		cfg.try_deserialize()
	}
}
