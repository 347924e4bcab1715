//! Lookup table of chain adapters.
//!
//! The `AdapterTable` maps every [`ChainId`] to at most one adapter. Because
//! the chain set is closed, the table is a fixed-size array indexed by
//! [`ChainId::index`] instead of a hash map.
//!
//! # Thread Safety
//!
//! The table is cheap to clone and immutable once built. Adapters are stored
//! as `Arc<dyn ChainAdapter>` so that concurrent quote computations can call
//! them without coordination.

use crate::adapter::ChainAdapter;
use crate::implementations::{build_adapter, AdapterConfig};
use solver_types::{AdapterError, ChainId, Result, SolverError};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, info};

/// Adapters indexed by chain.
#[derive(Debug, Clone, Default)]
pub struct AdapterTable {
	adapters: [Option<Arc<dyn ChainAdapter>>; ChainId::COUNT],
}

impl AdapterTable {
	/// Creates a new empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers an adapter under the chain it reports.
	///
	/// # Errors
	///
	/// Returns an error if an adapter for the same chain is already registered.
	pub fn register(&mut self, adapter: Arc<dyn ChainAdapter>) -> Result<()> {
		let chain_id = adapter.chain_id();
		info!(
			"Registering chain adapter {} for chain {}",
			adapter.name(),
			chain_id
		);

		let slot = &mut self.adapters[chain_id.index()];
		if slot.is_some() {
			return Err(SolverError::Config(format!(
				"Chain {} already registered",
				chain_id
			)));
		}

		*slot = Some(adapter);
		Ok(())
	}

	/// Builder-style variant of [`AdapterTable::register`].
	pub fn with_adapter(mut self, adapter: Arc<dyn ChainAdapter>) -> Result<Self> {
		self.register(adapter)?;
		Ok(self)
	}

	/// Retrieves the adapter for a chain, if one is registered.
	pub fn get(&self, chain_id: ChainId) -> Option<Arc<dyn ChainAdapter>> {
		self.adapters[chain_id.index()].clone()
	}

	/// Retrieves the adapter for a chain, returning an adapter error if it is missing.
	pub fn get_required(&self, chain_id: ChainId) -> Result<Arc<dyn ChainAdapter>> {
		self.get(chain_id).ok_or_else(|| {
			SolverError::adapter(
				chain_id,
				AdapterError::Unavailable(format!("no adapter registered for {}", chain_id)),
			)
		})
	}

	/// Chains with a registered adapter, in table order.
	pub fn chains(&self) -> Vec<ChainId> {
		ChainId::ALL
			.iter()
			.copied()
			.filter(|chain| self.adapters[chain.index()].is_some())
			.collect()
	}

	pub fn len(&self) -> usize {
		self.adapters.iter().filter(|slot| slot.is_some()).count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Creates a table from per-chain adapter configurations.
	///
	/// # Errors
	///
	/// Returns an error if any adapter cannot be constructed.
	pub fn from_configs(configs: &HashMap<ChainId, AdapterConfig>) -> Result<Self> {
		let mut table = Self::new();
		for chain_id in ChainId::ALL {
			if let Some(config) = configs.get(&chain_id) {
				debug!("Building {} adapter for chain {}", config.kind(), chain_id);
				table.register(build_adapter(chain_id, config)?)?;
			}
		}
		Ok(table)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use solver_types::{AdapterResult, LiquiditySource, TokenRef, U256};

	#[derive(Debug)]
	struct NullAdapter(ChainId);

	#[async_trait]
	impl ChainAdapter for NullAdapter {
		fn chain_id(&self) -> ChainId {
			self.0
		}

		fn name(&self) -> &str {
			"null"
		}

		async fn get_liquidity_sources(
			&self,
			_source_token: &TokenRef,
			_destination_token: &TokenRef,
			_amount: U256,
		) -> AdapterResult<Vec<LiquiditySource>> {
			Ok(Vec::new())
		}
	}

	#[test]
	fn test_register_and_lookup() {
		let table = AdapterTable::new()
			.with_adapter(Arc::new(NullAdapter(ChainId::Near)))
			.unwrap()
			.with_adapter(Arc::new(NullAdapter(ChainId::Ethereum)))
			.unwrap();

		assert_eq!(table.len(), 2);
		assert_eq!(table.chains(), vec![ChainId::Ethereum, ChainId::Near]);
		assert!(table.get(ChainId::Near).is_some());
		assert!(table.get(ChainId::Cosmos).is_none());
	}

	#[test]
	fn test_duplicate_registration_fails() {
		let mut table = AdapterTable::new();
		table.register(Arc::new(NullAdapter(ChainId::Bitcoin))).unwrap();
		let result = table.register(Arc::new(NullAdapter(ChainId::Bitcoin)));
		assert!(matches!(result, Err(SolverError::Config(_))));
	}

	#[test]
	fn test_get_required_reports_missing_chain() {
		let table = AdapterTable::new();
		match table.get_required(ChainId::Cosmos) {
			Err(SolverError::Adapter { chain, .. }) => assert_eq!(chain, ChainId::Cosmos),
			other => panic!("unexpected result: {:?}", other),
		}
		assert!(table.is_empty());
	}
}
