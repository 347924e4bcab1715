//! Route selection and liquidity collection.
//!
//! The router turns a chain pair into a hop topology, assigns each hop its
//! input and output token, and asks the responsible chain adapters for
//! liquidity. Route shapes depend only on the chain pair and configuration,
//! so identical inputs always yield identical routes.

use crate::config::RoutingConfig;
use solver_chains::AdapterTable;
use solver_types::{
	ChainId, Hop, HopKind, HopLiquidity, LiquiditySource, Result, SolverError,
	TokenRef, U256,
};
use tracing::{debug, instrument};

const FALLBACK_SWAP_PROTOCOL: &str = "spot";

/// Directed bridge lanes, indexed `[from][to]`.
type LaneTable = [[Option<String>; ChainId::COUNT]; ChainId::COUNT];

/// A hop with the tokens it converts between.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
	pub hop: Hop,
	pub token_in: TokenRef,
	pub token_out: TokenRef,
}

/// Chooses hop topologies and collects per-hop liquidity.
#[derive(Debug, Clone)]
pub struct Router {
	config: RoutingConfig,
	lanes: LaneTable,
}

impl Router {
	/// Creates a router from configuration.
	///
	/// # Errors
	///
	/// Returns a configuration error if a hub or bridge endpoint has no
	/// bridge asset, or if a bridge connects a chain to itself.
	pub fn new(config: RoutingConfig) -> Result<Self> {
		let mut lanes: LaneTable = Default::default();

		for bridge in &config.bridges {
			if bridge.from == bridge.to {
				return Err(SolverError::Config(format!(
					"bridge {} connects {} to itself",
					bridge.protocol, bridge.from
				)));
			}
			for chain in [bridge.from, bridge.to] {
				if !config.bridge_assets.contains_key(&chain) {
					return Err(SolverError::Config(format!(
						"bridge {} endpoint {} has no bridge asset",
						bridge.protocol, chain
					)));
				}
			}

			lanes[bridge.from.index()][bridge.to.index()] = Some(bridge.protocol.clone());
			if bridge.bidirectional {
				lanes[bridge.to.index()][bridge.from.index()] = Some(bridge.protocol.clone());
			}
		}

		for hub in &config.hub_chains {
			if !config.bridge_assets.contains_key(hub) {
				return Err(SolverError::Config(format!(
					"hub chain {} has no bridge asset",
					hub
				)));
			}
		}

		for (chain, asset) in &config.bridge_assets {
			if asset.chain_id != *chain {
				return Err(SolverError::Config(format!(
					"bridge asset {} is configured for {} but lives on {}",
					asset.symbol, chain, asset.chain_id
				)));
			}
		}

		Ok(Self { config, lanes })
	}

	pub fn config(&self) -> &RoutingConfig {
		&self.config
	}

	fn lane(&self, from: ChainId, to: ChainId) -> Option<&str> {
		self.lanes[from.index()][to.index()].as_deref()
	}

	fn swap_protocol(&self, chain: ChainId) -> &str {
		self.config
			.swap_protocols
			.get(&chain)
			.map(String::as_str)
			.unwrap_or(FALLBACK_SWAP_PROTOCOL)
	}

	fn bridge_asset(&self, chain: ChainId) -> Result<&TokenRef> {
		self.config
			.bridge_assets
			.get(&chain)
			.ok_or_else(|| SolverError::Config(format!("no bridge asset for {}", chain)))
	}

	/// Determines the hop topology between two chains.
	///
	/// - same chain: `[swap]`
	/// - direct lane: `[swap, bridge]`
	/// - via the first configured hub with lanes on both sides: `[swap, bridge, bridge]`
	pub fn determine_route(&self, source_chain: ChainId, destination_chain: ChainId) -> Result<Vec<Hop>> {
		let swap = Hop::swap(source_chain, self.swap_protocol(source_chain));

		if source_chain == destination_chain {
			return Ok(vec![swap]);
		}

		if let Some(protocol) = self.lane(source_chain, destination_chain) {
			return Ok(vec![
				swap,
				Hop::bridge(source_chain, destination_chain, protocol),
			]);
		}

		for &hub in &self.config.hub_chains {
			if hub == source_chain || hub == destination_chain {
				continue;
			}
			if let (Some(first), Some(second)) = (
				self.lane(source_chain, hub),
				self.lane(hub, destination_chain),
			) {
				debug!(
					"Routing {} -> {} through hub {}",
					source_chain, destination_chain, hub
				);
				return Ok(vec![
					swap,
					Hop::bridge(source_chain, hub, first),
					Hop::bridge(hub, destination_chain, second),
				]);
			}
		}

		Err(SolverError::NoRoute {
			from: source_chain,
			to: destination_chain,
		})
	}

	/// Assigns input and output tokens to every hop of `route`.
	///
	/// Intermediate hops settle in the bridge asset of the chain holding their
	/// output; the last hop delivers `destination_token`.
	pub fn plan_legs(
		&self,
		route: &[Hop],
		source_token: &TokenRef,
		destination_token: &TokenRef,
	) -> Result<Vec<Leg>> {
		let mut legs = Vec::with_capacity(route.len());
		let mut current = source_token.clone();

		for (i, hop) in route.iter().enumerate() {
			let token_out = if i + 1 == route.len() {
				destination_token.clone()
			} else {
				self.bridge_asset(hop.output_chain())?.clone()
			};

			legs.push(Leg {
				hop: hop.clone(),
				token_in: current,
				token_out: token_out.clone(),
			});
			current = token_out;
		}

		Ok(legs)
	}

	/// Queries liquidity for every hop of `route`, in hop order.
	///
	/// The first hop is quoted on `amount`; every later hop is quoted on the
	/// best output of the hop before it, so capacity limits and price impact
	/// see the amount that actually flows through. A swap hop whose input and
	/// output token coincide needs no venue and is answered locally at 1:1.
	/// The first adapter failure aborts collection.
	#[instrument(skip_all, fields(hops = route.len()))]
	pub async fn collect_liquidity(
		&self,
		adapters: &AdapterTable,
		route: &[Hop],
		source_token: &TokenRef,
		destination_token: &TokenRef,
		amount: U256,
	) -> Result<Vec<HopLiquidity>> {
		let legs = self.plan_legs(route, source_token, destination_token)?;
		let mut collected = Vec::with_capacity(legs.len());
		let mut flowing = amount;

		for leg in legs {
			let liquidity = self.quote_leg(adapters, leg, flowing).await?;
			flowing = liquidity
				.best_source()
				.map(|source| source.estimated_output)
				.ok_or(SolverError::NoLiquidity {
					chain: liquidity.hop.chain,
				})?;
			collected.push(liquidity);
		}

		Ok(collected)
	}

	async fn quote_leg(
		&self,
		adapters: &AdapterTable,
		leg: Leg,
		quoted_amount: U256,
	) -> Result<HopLiquidity> {
		let sources = if leg.hop.kind == HopKind::Swap && leg.token_in == leg.token_out {
			vec![passthrough(&leg.hop, quoted_amount)]
		} else {
			let adapter = adapters.get_required(leg.hop.chain)?;
			adapter
				.get_liquidity_sources(&leg.token_in, &leg.token_out, quoted_amount)
				.await
				.map_err(|e| SolverError::adapter(leg.hop.chain, e))?
		};

		debug!(
			"{} returned {} sources for {}",
			leg.hop,
			sources.len(),
			quoted_amount
		);

		Ok(HopLiquidity {
			hop: leg.hop,
			token_in: leg.token_in,
			token_out: leg.token_out,
			quoted_amount,
			sources,
		})
	}
}

fn passthrough(hop: &Hop, amount: U256) -> LiquiditySource {
	LiquiditySource {
		protocol: hop.protocol.clone(),
		input_amount: amount,
		estimated_output: amount,
		fee: U256::ZERO,
		confidence: 100,
		liquidity_depth: U256::MAX,
	}
}
