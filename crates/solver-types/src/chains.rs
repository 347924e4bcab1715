//! Chain-family identifiers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Chain family supported by the solver.
///
/// The set is closed so adapter lookups can be backed by a fixed-size table
/// and every `match` over chains is checked for exhaustiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChainId {
	Ethereum,
	Near,
	Cosmos,
	Bitcoin,
}

impl ChainId {
	/// Number of supported chain families.
	pub const COUNT: usize = 4;

	/// All chain families in table order.
	pub const ALL: [ChainId; ChainId::COUNT] = [
		ChainId::Ethereum,
		ChainId::Near,
		ChainId::Cosmos,
		ChainId::Bitcoin,
	];

	/// Position of this chain in [`ChainId::ALL`].
	pub const fn index(self) -> usize {
		match self {
			ChainId::Ethereum => 0,
			ChainId::Near => 1,
			ChainId::Cosmos => 2,
			ChainId::Bitcoin => 3,
		}
	}

	/// Canonical lowercase name, as used on the wire and in configuration.
	pub const fn as_str(self) -> &'static str {
		match self {
			ChainId::Ethereum => "ethereum",
			ChainId::Near => "near",
			ChainId::Cosmos => "cosmos",
			ChainId::Bitcoin => "bitcoin",
		}
	}
}

impl fmt::Display for ChainId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error returned when a chain name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown chain: {0}")]
pub struct UnknownChain(pub String);

impl FromStr for ChainId {
	type Err = UnknownChain;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"ethereum" | "eth" | "evm" => Ok(ChainId::Ethereum),
			"near" => Ok(ChainId::Near),
			"cosmos" | "atom" | "cosmoshub" => Ok(ChainId::Cosmos),
			"bitcoin" | "btc" => Ok(ChainId::Bitcoin),
			_ => Err(UnknownChain(s.to_string())),
		}
	}
}

impl Serialize for ChainId {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for ChainId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		raw.parse().map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_index_matches_table_order() {
		for (position, chain) in ChainId::ALL.iter().enumerate() {
			assert_eq!(chain.index(), position);
		}
	}

	#[test]
	fn test_parse_aliases() {
		assert_eq!("ETH".parse::<ChainId>().unwrap(), ChainId::Ethereum);
		assert_eq!("near".parse::<ChainId>().unwrap(), ChainId::Near);
		assert_eq!("Cosmos".parse::<ChainId>().unwrap(), ChainId::Cosmos);
		assert_eq!("btc".parse::<ChainId>().unwrap(), ChainId::Bitcoin);
		assert!("solana".parse::<ChainId>().is_err());
	}

	#[test]
	fn test_serde_uses_lowercase_names() {
		let json = serde_json::to_string(&ChainId::Near).unwrap();
		assert_eq!(json, "\"near\"");

		let parsed: ChainId = serde_json::from_str("\"ETH\"").unwrap();
		assert_eq!(parsed, ChainId::Ethereum);
	}
}
