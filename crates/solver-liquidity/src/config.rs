//! Routing topology configuration.

use serde::{Deserialize, Serialize};
use solver_types::{ChainId, TokenRef};
use std::collections::HashMap;

fn default_true() -> bool {
	true
}

/// A bridge connection between two chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeRoute {
	pub from: ChainId,
	pub to: ChainId,
	pub protocol: String,
	/// Also register the `to -> from` lane.
	#[serde(default = "default_true")]
	pub bidirectional: bool,
}

/// Routing topology: which chains bridge directly, which act as hubs, and
/// which asset each chain bridges in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
	/// Hub chains in preference order.
	#[serde(default = "default_hub_chains")]
	pub hub_chains: Vec<ChainId>,
	#[serde(default = "default_bridges")]
	pub bridges: Vec<BridgeRoute>,
	#[serde(default = "default_swap_protocols")]
	pub swap_protocols: HashMap<ChainId, String>,
	#[serde(default = "default_bridge_assets")]
	pub bridge_assets: HashMap<ChainId, TokenRef>,
}

impl Default for RoutingConfig {
	fn default() -> Self {
		Self {
			hub_chains: default_hub_chains(),
			bridges: default_bridges(),
			swap_protocols: default_swap_protocols(),
			bridge_assets: default_bridge_assets(),
		}
	}
}

fn default_hub_chains() -> Vec<ChainId> {
	vec![ChainId::Ethereum]
}

fn default_bridges() -> Vec<BridgeRoute> {
	[
		(ChainId::Near, "rainbow-bridge"),
		(ChainId::Cosmos, "axelar"),
		(ChainId::Bitcoin, "htlc"),
	]
	.into_iter()
	.map(|(to, protocol)| BridgeRoute {
		from: ChainId::Ethereum,
		to,
		protocol: protocol.to_string(),
		bidirectional: true,
	})
	.collect()
}

fn default_swap_protocols() -> HashMap<ChainId, String> {
	HashMap::from([
		(ChainId::Ethereum, "uniswap-v3".to_string()),
		(ChainId::Near, "ref-finance".to_string()),
		(ChainId::Cosmos, "osmosis".to_string()),
		(ChainId::Bitcoin, "htlc".to_string()),
	])
}

fn default_bridge_assets() -> HashMap<ChainId, TokenRef> {
	HashMap::from([
		(
			ChainId::Ethereum,
			TokenRef::new(
				ChainId::Ethereum,
				"0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
				"USDC",
				6,
			),
		),
		(
			ChainId::Near,
			TokenRef::new(
				ChainId::Near,
				"17208628f84f5d6ad33f0da3bbbeb27ffcb398eac501a31bd6ad2011e36133a1",
				"USDC",
				6,
			),
		),
		(
			ChainId::Cosmos,
			TokenRef::new(
				ChainId::Cosmos,
				"ibc/498A0751C798A0D9A389AA3691123DADA57DAA4FE165D5C75894505B876BA6E4",
				"USDC",
				6,
			),
		),
		(
			ChainId::Bitcoin,
			TokenRef::new(ChainId::Bitcoin, "btc", "BTC", 8),
		),
	])
}
