//! Config-driven liquidity adapter.
//!
//! Serves quotes from a static set of constant-product pools and bridge lanes
//! declared in configuration. Useful for local deployments, test networks and
//! as a deterministic stand-in for a chain's real liquidity venues.

use crate::adapter::ChainAdapter;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solver_types::{
	common::u256_decimal, rescale_amount, AdapterError, AdapterResult, ChainId, LiquiditySource,
	TokenRef, BPS_DENOMINATOR, U256,
};
use std::time::Duration;
use tracing::debug;

fn default_confidence() -> u8 {
	95
}

fn default_rate() -> Decimal {
	Decimal::ONE
}

/// A constant-product pool between two tokens on the adapter's chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
	pub protocol: String,
	pub token_a: String,
	pub token_b: String,
	#[serde(with = "u256_decimal")]
	pub reserve_a: U256,
	#[serde(with = "u256_decimal")]
	pub reserve_b: U256,
	#[serde(default)]
	pub fee_bps: u32,
	#[serde(default = "default_confidence")]
	pub confidence: u8,
}

/// A bridge lane from a token on the adapter's chain to a token on another chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeLaneConfig {
	pub protocol: String,
	pub source_token: String,
	pub destination_chain: ChainId,
	pub destination_token: String,
	/// Destination units per source unit, after decimal rescaling.
	#[serde(default = "default_rate")]
	pub rate: Decimal,
	#[serde(default)]
	pub fee_bps: u32,
	#[serde(default = "default_confidence")]
	pub confidence: u8,
	/// Maximum transferable amount in source-token units.
	#[serde(with = "u256_decimal")]
	pub liquidity: U256,
}

/// Configuration for [`PoolAdapter`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolAdapterConfig {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub pools: Vec<PoolConfig>,
	#[serde(default)]
	pub bridges: Vec<BridgeLaneConfig>,
	/// Artificial delay added to every lookup.
	#[serde(default)]
	pub latency_ms: u64,
}

/// Adapter that prices swaps and bridges from static configuration.
#[derive(Debug)]
pub struct PoolAdapter {
	chain_id: ChainId,
	name: String,
	config: PoolAdapterConfig,
}

impl PoolAdapter {
	pub fn new(chain_id: ChainId, config: PoolAdapterConfig) -> AdapterResult<Self> {
		for pool in &config.pools {
			if pool.fee_bps as u64 >= BPS_DENOMINATOR || pool.confidence > 100 {
				return Err(AdapterError::InvalidResponse(format!(
					"pool {} has invalid fee or confidence",
					pool.protocol
				)));
			}
		}
		for lane in &config.bridges {
			if lane.fee_bps as u64 >= BPS_DENOMINATOR
				|| lane.confidence > 100
				|| lane.rate <= Decimal::ZERO
			{
				return Err(AdapterError::InvalidResponse(format!(
					"bridge lane {} has invalid fee, confidence or rate",
					lane.protocol
				)));
			}
		}

		let name = config
			.name
			.clone()
			.unwrap_or_else(|| format!("{}-pools", chain_id));

		Ok(Self {
			chain_id,
			name,
			config,
		})
	}

	fn swap_sources(
		&self,
		source_token: &TokenRef,
		destination_token: &TokenRef,
		amount: U256,
	) -> AdapterResult<Vec<LiquiditySource>> {
		let mut sources = Vec::new();

		for pool in &self.config.pools {
			let (reserve_in, reserve_out) = if pool.token_a == source_token.address
				&& pool.token_b == destination_token.address
			{
				(pool.reserve_a, pool.reserve_b)
			} else if pool.token_b == source_token.address
				&& pool.token_a == destination_token.address
			{
				(pool.reserve_b, pool.reserve_a)
			} else {
				continue;
			};

			let after_fee = apply_fee(amount, pool.fee_bps)?;
			let output = constant_product_output(after_fee, reserve_in, reserve_out)?;
			if output.is_zero() {
				continue;
			}

			sources.push(LiquiditySource {
				protocol: pool.protocol.clone(),
				input_amount: amount,
				estimated_output: output,
				fee: amount - after_fee,
				confidence: pool.confidence,
				liquidity_depth: reserve_in,
			});
		}

		Ok(sources)
	}

	fn bridge_sources(
		&self,
		source_token: &TokenRef,
		destination_token: &TokenRef,
		amount: U256,
	) -> AdapterResult<Vec<LiquiditySource>> {
		let mut sources = Vec::new();

		for lane in &self.config.bridges {
			if lane.source_token != source_token.address
				|| lane.destination_chain != destination_token.chain_id
				|| lane.destination_token != destination_token.address
			{
				continue;
			}
			if amount > lane.liquidity {
				debug!(
					"Lane {} cannot carry {} (liquidity {})",
					lane.protocol, amount, lane.liquidity
				);
				continue;
			}

			let after_fee = apply_fee(amount, lane.fee_bps)?;
			let rescaled =
				rescale_amount(after_fee, source_token.decimals, destination_token.decimals)
					.ok_or_else(|| overflow("rescale"))?;
			let output = apply_rate(rescaled, lane.rate)?;
			if output.is_zero() {
				continue;
			}

			sources.push(LiquiditySource {
				protocol: lane.protocol.clone(),
				input_amount: amount,
				estimated_output: output,
				fee: amount - after_fee,
				confidence: lane.confidence,
				liquidity_depth: lane.liquidity,
			});
		}

		Ok(sources)
	}
}

#[async_trait]
impl ChainAdapter for PoolAdapter {
	fn chain_id(&self) -> ChainId {
		self.chain_id
	}

	fn name(&self) -> &str {
		&self.name
	}

	async fn get_liquidity_sources(
		&self,
		source_token: &TokenRef,
		destination_token: &TokenRef,
		amount: U256,
	) -> AdapterResult<Vec<LiquiditySource>> {
		if source_token.chain_id != self.chain_id {
			return Err(AdapterError::ChainMismatch {
				expected: self.chain_id,
				actual: source_token.chain_id,
			});
		}

		if self.config.latency_ms > 0 {
			tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
		}

		let sources = if destination_token.chain_id == self.chain_id {
			self.swap_sources(source_token, destination_token, amount)?
		} else {
			self.bridge_sources(source_token, destination_token, amount)?
		};

		debug!(
			"{} found {} sources for {} -> {}",
			self.name,
			sources.len(),
			source_token,
			destination_token
		);

		Ok(sources)
	}
}

fn overflow(operation: &str) -> AdapterError {
	AdapterError::InvalidResponse(format!("arithmetic overflow during {}", operation))
}

fn apply_fee(amount: U256, fee_bps: u32) -> AdapterResult<U256> {
	let keep = U256::from(BPS_DENOMINATOR - fee_bps as u64);
	amount
		.checked_mul(keep)
		.map(|v| v / U256::from(BPS_DENOMINATOR))
		.ok_or_else(|| overflow("fee"))
}

/// `out = in * reserve_out / (reserve_in + in)`
fn constant_product_output(
	amount_in: U256,
	reserve_in: U256,
	reserve_out: U256,
) -> AdapterResult<U256> {
	let numerator = amount_in
		.checked_mul(reserve_out)
		.ok_or_else(|| overflow("swap"))?;
	let denominator = reserve_in
		.checked_add(amount_in)
		.ok_or_else(|| overflow("swap"))?;
	if denominator.is_zero() {
		return Ok(U256::ZERO);
	}
	Ok(numerator / denominator)
}

fn apply_rate(amount: U256, rate: Decimal) -> AdapterResult<U256> {
	let mantissa = u128::try_from(rate.mantissa()).map_err(|_| overflow("rate"))?;
	let scale = U256::from(10u64)
		.checked_pow(U256::from(rate.scale()))
		.ok_or_else(|| overflow("rate"))?;
	amount
		.checked_mul(U256::from(mantissa))
		.map(|v| v / scale)
		.ok_or_else(|| overflow("rate"))
}
