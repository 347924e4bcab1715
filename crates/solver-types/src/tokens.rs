//! Fungible asset references.

use crate::chains::ChainId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A fungible asset on a specific chain.
///
/// Identity is `(chain_id, address)`: the same symbol on two chains is two
/// different assets, and symbol/decimals are descriptive only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRef {
	/// Contract address, account id or denom, depending on the chain family.
	#[serde(alias = "denom")]
	pub address: String,
	pub symbol: String,
	pub decimals: u8,
	pub chain_id: ChainId,
}

impl TokenRef {
	pub fn new(
		chain_id: ChainId,
		address: impl Into<String>,
		symbol: impl Into<String>,
		decimals: u8,
	) -> Self {
		Self {
			address: address.into(),
			symbol: symbol.into(),
			decimals,
			chain_id,
		}
	}
}

impl PartialEq for TokenRef {
	fn eq(&self, other: &Self) -> bool {
		self.chain_id == other.chain_id && self.address == other.address
	}
}

impl Eq for TokenRef {}

impl Hash for TokenRef {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.chain_id.hash(state);
		self.address.hash(state);
	}
}

impl fmt::Display for TokenRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.chain_id, self.symbol)
	}
}
