//! Folding per-hop liquidity into a single quote.

use crate::config::PricingConfig;
use solver_types::{
	now_ms, HopLiquidity, LiquiditySource, Quote, QuoteRequest, Result, SolverError, Urgency,
	BPS_DENOMINATOR, U256,
};
use std::time::Duration;
use tracing::{debug, instrument};

/// Parts per million, used for price impact accumulation.
const PPM: u64 = 1_000_000;

const DEFAULT_QUOTE_VALIDITY: Duration = Duration::from_secs(30);

/// Prices routes.
///
/// Stateless apart from its configuration; a single instance is shared by all
/// concurrent quote computations.
#[derive(Debug, Clone)]
pub struct Pricer {
	config: PricingConfig,
	quote_validity: Duration,
}

impl Pricer {
	/// Creates a pricer after validating `config`.
	pub fn new(config: PricingConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self {
			config,
			quote_validity: DEFAULT_QUOTE_VALIDITY,
		})
	}

	/// Sets how long produced quotes stay valid.
	pub fn with_quote_validity(mut self, quote_validity: Duration) -> Self {
		self.quote_validity = quote_validity;
		self
	}

	pub fn config(&self) -> &PricingConfig {
		&self.config
	}

	/// Builds a quote for `request` from the liquidity collected along its route.
	#[instrument(skip_all, fields(request_id = %request.id, hops = liquidity.len()))]
	pub fn price(&self, request: &QuoteRequest, liquidity: &[HopLiquidity]) -> Result<Quote> {
		if liquidity.is_empty() {
			return Err(SolverError::NoRoute {
				from: request.source_chain,
				to: request.destination_chain,
			});
		}

		let best = liquidity
			.iter()
			.map(|hop| {
				hop.best_source().ok_or(SolverError::NoLiquidity {
					chain: hop.hop.chain,
				})
			})
			.collect::<Result<Vec<_>>>()?;

		let confidence = best.iter().map(|s| s.confidence).min().unwrap_or(0);
		if confidence == 0 {
			return Err(SolverError::ZeroConfidence);
		}

		let amount = request.source_amount;
		let solver_fee = self.solver_fee(amount, liquidity.len(), confidence, request.urgency())?;
		if solver_fee >= amount {
			return Err(SolverError::Uneconomic(format!(
				"amount {} does not cover solver fee {}",
				amount, solver_fee
			)));
		}

		let mut destination_amount = amount - solver_fee;
		for source in &best {
			destination_amount = destination_amount
				.checked_mul(source.estimated_output)
				.ok_or_else(|| SolverError::Arithmetic("destination amount overflow".into()))?
				/ source.input_amount;
		}
		if destination_amount.is_zero() {
			return Err(SolverError::Uneconomic(
				"destination amount rounds to zero".to_string(),
			));
		}

		let price_impact_bps = route_impact_bps(&best);
		let safety_deposit = destination_amount
			.checked_mul(U256::from(self.config.safety_deposit_bps))
			.ok_or_else(|| SolverError::Arithmetic("safety deposit overflow".into()))?
			/ U256::from(BPS_DENOMINATOR);

		let generated_at = now_ms();
		let expires_at = generated_at + self.quote_validity.as_millis() as u64;

		debug!(
			"Priced {}: out={} fee={} confidence={} impact={}bps",
			request.id, destination_amount, solver_fee, confidence, price_impact_bps
		);

		Ok(Quote {
			request_id: request.id.clone(),
			source_amount: amount,
			destination_amount,
			route: liquidity.iter().map(|h| h.hop.clone()).collect(),
			solver_fee,
			confidence,
			price_impact_bps,
			safety_deposit,
			generated_at,
			expires_at,
		})
	}

	/// Solver fee in source-token units.
	///
	/// `max(min_fee, amount * rate) * urgency`, where the rate grows with the
	/// hop count and with a premium for low-confidence routes.
	pub fn solver_fee(
		&self,
		amount: U256,
		hops: usize,
		confidence: u8,
		urgency: Urgency,
	) -> Result<U256> {
		let extra_hops = hops.saturating_sub(1) as u64;
		let mut fee_bps =
			self.config.base_fee_bps as u64 + self.config.per_hop_fee_bps as u64 * extra_hops;
		if confidence < self.config.low_confidence_threshold {
			fee_bps += self.config.low_confidence_premium_bps as u64;
		}

		let proportional = amount
			.checked_mul(U256::from(fee_bps))
			.ok_or_else(|| SolverError::Arithmetic("fee overflow".into()))?
			/ U256::from(BPS_DENOMINATOR);
		let base = proportional.max(self.config.min_fee);

		let multiplier_bps = self.config.urgency.bps_for(urgency)?;
		Ok(base
			.checked_mul(U256::from(multiplier_bps))
			.ok_or_else(|| SolverError::Arithmetic("fee overflow".into()))?
			/ U256::from(BPS_DENOMINATOR))
	}
}

/// `1 - prod(1 - in_k / (depth_k + in_k))`, in basis points.
fn route_impact_bps(sources: &[&LiquiditySource]) -> u32 {
	let ppm = U256::from(PPM);
	let mut retained = ppm;

	for source in sources {
		let depth = source.liquidity_depth.saturating_add(source.input_amount);
		let impact = if depth.is_zero() {
			ppm
		} else {
			source.input_amount.saturating_mul(ppm) / depth
		};
		retained = retained * (ppm - impact.min(ppm)) / ppm;
	}

	let impact_ppm = (ppm - retained).to::<u64>();
	(impact_ppm / (PPM / BPS_DENOMINATOR)) as u32
}
