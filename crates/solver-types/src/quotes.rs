//! Quote request, route and quote types.

use crate::{
	chains::ChainId,
	common::{u256_decimal, TimestampMs, U256},
	tokens::TokenRef,
};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

/// Caller-supplied priority hint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
	Low,
	#[default]
	Medium,
	High,
}

impl fmt::Display for Urgency {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Urgency::Low => write!(f, "low"),
			Urgency::Medium => write!(f, "medium"),
			Urgency::High => write!(f, "high"),
		}
	}
}

/// Free-form request metadata. Only `urgency` is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteMetadata {
	#[serde(default)]
	pub urgency: Urgency,
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A request to price a swap intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
	pub id: String,
	pub source_chain: ChainId,
	pub destination_chain: ChainId,
	pub source_token: TokenRef,
	pub destination_token: TokenRef,
	/// Amount of `source_token` in base units.
	#[serde(with = "u256_decimal")]
	pub source_amount: U256,
	#[serde(default)]
	pub metadata: QuoteMetadata,
}

impl QuoteRequest {
	pub fn urgency(&self) -> Urgency {
		self.metadata.urgency
	}

	pub fn is_cross_chain(&self) -> bool {
		self.source_chain != self.destination_chain
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HopKind {
	Swap,
	Bridge,
}

/// One segment of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hop {
	/// Chain the hop executes on (the sending side for bridges).
	pub chain: ChainId,
	pub kind: HopKind,
	pub protocol: String,
	/// Receiving chain of a bridge hop.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target_chain: Option<ChainId>,
}

impl Hop {
	pub fn swap(chain: ChainId, protocol: impl Into<String>) -> Self {
		Self {
			chain,
			kind: HopKind::Swap,
			protocol: protocol.into(),
			target_chain: None,
		}
	}

	pub fn bridge(from: ChainId, to: ChainId, protocol: impl Into<String>) -> Self {
		Self {
			chain: from,
			kind: HopKind::Bridge,
			protocol: protocol.into(),
			target_chain: Some(to),
		}
	}

	/// Chain that holds the hop's output.
	pub fn output_chain(&self) -> ChainId {
		self.target_chain.unwrap_or(self.chain)
	}
}

impl fmt::Display for Hop {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match (self.kind, self.target_chain) {
			(HopKind::Bridge, Some(to)) => {
				write!(f, "bridge[{}] {} -> {}", self.protocol, self.chain, to)
			}
			_ => write!(f, "swap[{}] on {}", self.protocol, self.chain),
		}
	}
}

/// Liquidity reported by an adapter for one hop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquiditySource {
	pub protocol: String,
	/// Input the estimate was computed for.
	#[serde(with = "u256_decimal")]
	pub input_amount: U256,
	/// Output received for `input_amount`, net of protocol fees.
	#[serde(with = "u256_decimal")]
	pub estimated_output: U256,
	/// Protocol fee charged, in input-token units.
	#[serde(with = "u256_decimal")]
	pub fee: U256,
	/// 0-100
	pub confidence: u8,
	/// Available depth in input-token units.
	#[serde(with = "u256_decimal")]
	pub liquidity_depth: U256,
}

/// Liquidity collected for one hop of a planned route.
#[derive(Debug, Clone, PartialEq)]
pub struct HopLiquidity {
	pub hop: Hop,
	pub token_in: TokenRef,
	pub token_out: TokenRef,
	/// Amount the adapter was asked to quote, in `token_in` units.
	pub quoted_amount: U256,
	pub sources: Vec<LiquiditySource>,
}

impl LiquiditySource {
	/// Orders sources by output per unit of input.
	pub fn cmp_rate(&self, other: &Self) -> Ordering {
		let lhs = self.estimated_output.saturating_mul(other.input_amount);
		let rhs = other.estimated_output.saturating_mul(self.input_amount);
		lhs.cmp(&rhs)
	}

	pub fn is_usable(&self) -> bool {
		!self.input_amount.is_zero() && !self.estimated_output.is_zero()
	}
}

impl HopLiquidity {
	/// Highest output per unit of input wins; ties go to the more confident source.
	pub fn best_source(&self) -> Option<&LiquiditySource> {
		self.sources
			.iter()
			.filter(|s| s.is_usable())
			.max_by(|a, b| a.cmp_rate(b).then(a.confidence.cmp(&b.confidence)))
	}
}

/// A priced, routed answer to a [`QuoteRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
	pub request_id: String,
	#[serde(with = "u256_decimal")]
	pub source_amount: U256,
	#[serde(with = "u256_decimal")]
	pub destination_amount: U256,
	pub route: Vec<Hop>,
	/// Solver fee in source-token base units.
	#[serde(with = "u256_decimal")]
	pub solver_fee: U256,
	/// 0-100
	pub confidence: u8,
	pub price_impact_bps: u32,
	/// Deposit the resolver posts on the destination chain, in destination-token units.
	#[serde(with = "u256_decimal")]
	pub safety_deposit: U256,
	pub generated_at: TimestampMs,
	pub expires_at: TimestampMs,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_request_json() -> &'static str {
		r#"{
			"id": "req-1",
			"sourceChain": "ethereum",
			"destinationChain": "near",
			"sourceToken": {"address":"0xeeee","symbol":"ETH","decimals":18,"chainId":"ethereum"},
			"destinationToken": {"address":"wrap.near","symbol":"wNEAR","decimals":24,"chainId":"near"},
			"sourceAmount": "1000000000000000000",
			"metadata": {"urgency": "high", "client": "ui"}
		}"#
	}

	#[test]
	fn test_quote_request_deserialization() {
		let request: QuoteRequest = serde_json::from_str(sample_request_json()).unwrap();
		assert_eq!(request.id, "req-1");
		assert_eq!(request.source_chain, ChainId::Ethereum);
		assert_eq!(request.destination_chain, ChainId::Near);
		assert_eq!(request.urgency(), Urgency::High);
		assert_eq!(
			request.metadata.extra.get("client"),
			Some(&serde_json::Value::String("ui".into()))
		);
		assert!(request.is_cross_chain());
	}

	#[test]
	fn test_missing_metadata_defaults_to_medium_urgency() {
		let json = r#"{
			"id": "req-2",
			"sourceChain": "ethereum",
			"destinationChain": "ethereum",
			"sourceToken": {"address":"0xeeee","symbol":"ETH","decimals":18,"chainId":"ethereum"},
			"destinationToken": {"address":"0xa0b8","symbol":"USDC","decimals":6,"chainId":"ethereum"},
			"sourceAmount": 5
		}"#;
		let request: QuoteRequest = serde_json::from_str(json).unwrap();
		assert_eq!(request.urgency(), Urgency::Medium);
		assert!(!request.is_cross_chain());
	}

	#[test]
	fn test_best_source_prefers_rate_then_confidence() {
		let source = |input: u64, output: u64, confidence: u8| LiquiditySource {
			protocol: "p".into(),
			input_amount: U256::from(input),
			estimated_output: U256::from(output),
			fee: U256::ZERO,
			confidence,
			liquidity_depth: U256::from(1_000u64),
		};
		let token = TokenRef::new(ChainId::Ethereum, "0xa0b8", "USDC", 6);
		let mut hop = HopLiquidity {
			hop: Hop::swap(ChainId::Ethereum, "uniswap-v3"),
			token_in: token.clone(),
			token_out: token,
			quoted_amount: U256::from(100u64),
			sources: vec![source(100, 90, 99), source(100, 95, 80), source(100, 95, 90)],
		};
		assert_eq!(hop.best_source().map(|s| s.confidence), Some(90));

		hop.sources = vec![source(100, 0, 99), source(0, 50, 99)];
		assert!(hop.best_source().is_none());
	}

	#[test]
	fn test_urgency_ordering() {
		assert!(Urgency::Low < Urgency::Medium);
		assert!(Urgency::Medium < Urgency::High);
	}

	#[test]
	fn test_hop_serialization_omits_target_for_swaps() {
		let swap = serde_json::to_value(Hop::swap(ChainId::Ethereum, "uniswap-v3")).unwrap();
		assert_eq!(swap["kind"], "swap");
		assert!(swap.get("targetChain").is_none());

		let bridge = Hop::bridge(ChainId::Ethereum, ChainId::Near, "rainbow");
		assert_eq!(bridge.output_chain(), ChainId::Near);
		let value = serde_json::to_value(&bridge).unwrap();
		assert_eq!(value["targetChain"], "near");
	}
}
