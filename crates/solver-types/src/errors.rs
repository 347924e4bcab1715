//! Error types for the solver system.

use crate::chains::ChainId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SolverError>;

pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Errors raised while producing a quote.
///
/// Every variant is recoverable from the point of view of the process: the
/// request it belongs to simply receives no quote.
#[derive(Error, Debug)]
pub enum SolverError {
	#[error("Validation error: {0}")]
	Validation(String),

	#[error("Adapter error on {chain}: {source}")]
	Adapter {
		chain: ChainId,
		#[source]
		source: AdapterError,
	},

	#[error("No route from {from} to {to}")]
	NoRoute { from: ChainId, to: ChainId },

	#[error("No liquidity for hop on {chain}")]
	NoLiquidity { chain: ChainId },

	#[error("Route is not economic: {0}")]
	Uneconomic(String),

	#[error("Route confidence is zero")]
	ZeroConfidence,

	#[error("Quote generation timed out after {0}ms")]
	Timeout(u64),

	#[error("Arithmetic error: {0}")]
	Arithmetic(String),

	#[error("Quote generator is not initialized")]
	NotInitialized,

	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl SolverError {
	pub fn adapter(chain: ChainId, source: AdapterError) -> Self {
		SolverError::Adapter { chain, source }
	}

	/// True for failures caused by the request itself rather than by liquidity sources.
	pub fn is_validation(&self) -> bool {
		matches!(self, SolverError::Validation(_))
	}
}

/// Errors reported by a chain adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
	#[error("Liquidity source unavailable: {0}")]
	Unavailable(String),

	#[error("Unsupported pair {from} -> {to}")]
	UnsupportedPair { from: String, to: String },

	#[error("Invalid response: {0}")]
	InvalidResponse(String),

	#[error("Network error: {0}")]
	Network(String),

	#[error("Adapter for {expected} cannot serve {actual}")]
	ChainMismatch { expected: ChainId, actual: ChainId },
}
