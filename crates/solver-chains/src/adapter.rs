//! The per-chain liquidity interface.

use async_trait::async_trait;
use solver_types::{AdapterResult, ChainId, LiquiditySource, TokenRef, U256};
use std::fmt::Debug;

/// Chain adapter trait for discovering liquidity on one chain family.
///
/// Implementations own their connections exclusively and must not share
/// mutable state with other adapters. A failing call affects only the request
/// that issued it.
#[async_trait]
pub trait ChainAdapter: Send + Sync + Debug {
	/// Get the chain this adapter serves
	fn chain_id(&self) -> ChainId;

	/// Human-readable adapter name for logging
	fn name(&self) -> &str;

	/// Get liquidity for converting `amount` of `source_token` into
	/// `destination_token`.
	///
	/// `source_token` always lives on this adapter's chain. When
	/// `destination_token` lives on another chain the request is for a bridge
	/// leg.
	async fn get_liquidity_sources(
		&self,
		source_token: &TokenRef,
		destination_token: &TokenRef,
		amount: U256,
	) -> AdapterResult<Vec<LiquiditySource>>;

	/// Check whether the underlying data source is reachable
	async fn health_check(&self) -> AdapterResult<bool> {
		Ok(true)
	}
}
