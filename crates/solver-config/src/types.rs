//! Configuration types for the solver.
//!
//! Each section reuses the configuration type of the crate that consumes it,
//! so a section deserializes straight into the component's own settings.

use serde::{Deserialize, Serialize};
use solver_chains::AdapterConfig;
use solver_core::QuoteConfig;
use solver_discovery::ListenerConfig;
use solver_liquidity::RoutingConfig;
use solver_monitoring::{LogFormat, TracingConfig};
use solver_pricing::PricingConfig;
use solver_types::ChainId;
use std::collections::HashMap;

/// Complete solver configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SolverConfig {
	/// Process-level settings
	#[serde(default)]
	pub solver: SolverSettings,
	/// Connection to the intent source
	#[serde(default)]
	pub listener: ListenerConfig,
	/// Quote generation limits
	#[serde(default)]
	pub quotes: QuoteConfig,
	/// Fee, impact and deposit parameters
	#[serde(default)]
	pub pricing: PricingConfig,
	/// Bridge topology
	#[serde(default)]
	pub routing: RoutingConfig,
	/// Liquidity adapter per chain
	#[serde(default)]
	pub adapters: HashMap<ChainId, AdapterConfig>,
}

/// Process-level settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SolverSettings {
	/// Solver name/identifier
	#[serde(default = "default_name")]
	pub name: String,
	/// Filter directive for logs, overridden by `RUST_LOG`
	#[serde(default = "default_log_level")]
	pub log_level: String,
	#[serde(default)]
	pub log_format: LogFormat,
	/// Port of the status server; 0 disables it
	#[serde(default = "default_http_port")]
	pub http_port: u16,
}

fn default_name() -> String {
	"oif-solver".to_string()
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_http_port() -> u16 {
	3000
}

impl Default for SolverSettings {
	fn default() -> Self {
		Self {
			name: default_name(),
			log_level: default_log_level(),
			log_format: LogFormat::default(),
			http_port: default_http_port(),
		}
	}
}

impl SolverConfig {
	pub fn tracing_config(&self) -> TracingConfig {
		TracingConfig::new(self.solver.log_level.clone(), self.solver.log_format)
	}

	/// Chains with an adapter, in table order.
	pub fn adapter_chains(&self) -> Vec<ChainId> {
		ChainId::ALL
			.into_iter()
			.filter(|chain| self.adapters.contains_key(chain))
			.collect()
	}
}
