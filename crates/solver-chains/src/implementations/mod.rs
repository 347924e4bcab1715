//! Chain adapter implementations.
//!
//! - **pool**: static constant-product pools and bridge lanes from configuration
//! - **http**: a remote liquidity API queried over HTTP
//!
//! Both are chain-family agnostic; a deployment picks one per chain in the
//! `[adapters.<chain>]` configuration section.

pub mod http;
pub mod pool;

use crate::adapter::ChainAdapter;
use serde::{Deserialize, Serialize};
use solver_types::{ChainId, Result, SolverError};
use std::sync::Arc;

pub use http::{HttpAdapter, HttpAdapterConfig};
pub use pool::{BridgeLaneConfig, PoolAdapter, PoolAdapterConfig, PoolConfig};

/// Adapter selection for one chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AdapterConfig {
	Pool(PoolAdapterConfig),
	Http(HttpAdapterConfig),
}

impl AdapterConfig {
	pub fn kind(&self) -> &'static str {
		match self {
			AdapterConfig::Pool(_) => "pool",
			AdapterConfig::Http(_) => "http",
		}
	}
}

/// Builds the adapter described by `config` for `chain_id`.
pub fn build_adapter(chain_id: ChainId, config: &AdapterConfig) -> Result<Arc<dyn ChainAdapter>> {
	let adapter: Arc<dyn ChainAdapter> = match config {
		AdapterConfig::Pool(config) => Arc::new(
			PoolAdapter::new(chain_id, config.clone())
				.map_err(|e| SolverError::adapter(chain_id, e))?,
		),
		AdapterConfig::Http(config) => Arc::new(
			HttpAdapter::new(chain_id, config.clone())
				.map_err(|e| SolverError::adapter(chain_id, e))?,
		),
	};
	Ok(adapter)
}
