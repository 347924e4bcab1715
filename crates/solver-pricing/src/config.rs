//! Pricing configuration.

use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Serialize};
use solver_types::{common::u256_decimal, Result, SolverError, Urgency, BPS_DENOMINATOR, U256};

/// Fee multipliers applied per urgency level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgencyMultipliers {
	#[serde(default = "default_low")]
	pub low: Decimal,
	#[serde(default = "default_medium")]
	pub medium: Decimal,
	#[serde(default = "default_high")]
	pub high: Decimal,
}

fn default_low() -> Decimal {
	Decimal::ONE
}

fn default_medium() -> Decimal {
	Decimal::new(15, 1)
}

fn default_high() -> Decimal {
	Decimal::TWO
}

impl Default for UrgencyMultipliers {
	fn default() -> Self {
		Self {
			low: default_low(),
			medium: default_medium(),
			high: default_high(),
		}
	}
}

impl UrgencyMultipliers {
	pub fn for_urgency(&self, urgency: Urgency) -> Decimal {
		match urgency {
			Urgency::Low => self.low,
			Urgency::Medium => self.medium,
			Urgency::High => self.high,
		}
	}

	/// Multiplier expressed in basis points (1.5 -> 15000).
	pub fn bps_for(&self, urgency: Urgency) -> Result<u64> {
		(self.for_urgency(urgency) * Decimal::from(BPS_DENOMINATOR))
			.round()
			.to_u64()
			.ok_or_else(|| {
				SolverError::Config(format!("urgency multiplier for {} is out of range", urgency))
			})
	}
}

/// Parameters of the solver fee, price impact and safety deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
	/// Fee charged on every route, in basis points of the source amount.
	#[serde(default = "default_base_fee_bps")]
	pub base_fee_bps: u32,
	/// Additional fee for every hop after the first.
	#[serde(default = "default_per_hop_fee_bps")]
	pub per_hop_fee_bps: u32,
	/// Floor for the fee before the urgency multiplier, in source-token base units.
	#[serde(default, with = "u256_decimal")]
	pub min_fee: U256,
	/// Routes below this confidence pay `low_confidence_premium_bps`.
	#[serde(default = "default_low_confidence_threshold")]
	pub low_confidence_threshold: u8,
	#[serde(default = "default_low_confidence_premium_bps")]
	pub low_confidence_premium_bps: u32,
	/// Resolver deposit on the destination chain, in basis points of the destination amount.
	#[serde(default = "default_safety_deposit_bps")]
	pub safety_deposit_bps: u32,
	#[serde(default)]
	pub urgency: UrgencyMultipliers,
}

fn default_base_fee_bps() -> u32 {
	30
}

fn default_per_hop_fee_bps() -> u32 {
	10
}

fn default_low_confidence_threshold() -> u8 {
	70
}

fn default_low_confidence_premium_bps() -> u32 {
	20
}

fn default_safety_deposit_bps() -> u32 {
	500
}

impl Default for PricingConfig {
	fn default() -> Self {
		Self {
			base_fee_bps: default_base_fee_bps(),
			per_hop_fee_bps: default_per_hop_fee_bps(),
			min_fee: U256::ZERO,
			low_confidence_threshold: default_low_confidence_threshold(),
			low_confidence_premium_bps: default_low_confidence_premium_bps(),
			safety_deposit_bps: default_safety_deposit_bps(),
			urgency: UrgencyMultipliers::default(),
		}
	}
}

impl PricingConfig {
	/// Validates the pricing configuration.
	pub fn validate(&self) -> Result<()> {
		for (name, value) in [
			("base_fee_bps", self.base_fee_bps),
			("per_hop_fee_bps", self.per_hop_fee_bps),
			("low_confidence_premium_bps", self.low_confidence_premium_bps),
			("safety_deposit_bps", self.safety_deposit_bps),
		] {
			if value as u64 > BPS_DENOMINATOR {
				return Err(SolverError::Config(format!(
					"{} must be at most {}",
					name, BPS_DENOMINATOR
				)));
			}
		}

		if self.low_confidence_threshold > 100 {
			return Err(SolverError::Config(
				"low_confidence_threshold must be between 0 and 100".to_string(),
			));
		}

		let u = &self.urgency;
		if u.low < Decimal::ONE {
			return Err(SolverError::Config(
				"urgency multipliers must be at least 1".to_string(),
			));
		}
		if !(u.low <= u.medium && u.medium <= u.high) {
			return Err(SolverError::Config(
				"urgency multipliers must satisfy low <= medium <= high".to_string(),
			));
		}
		for urgency in [Urgency::Low, Urgency::Medium, Urgency::High] {
			u.bps_for(urgency)?;
		}

		Ok(())
	}
}
