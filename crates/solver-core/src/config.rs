use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limits applied to quote generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
	/// Hard deadline for a single quote, routing and pricing included.
	#[serde(default = "default_quote_timeout_ms")]
	pub quote_timeout_ms: u64,
	/// How long a produced quote stays valid.
	#[serde(default = "default_quote_validity_secs")]
	pub quote_validity_secs: u64,
	/// Upper bound on quotes computed at the same time.
	#[serde(default = "default_max_concurrent_quotes")]
	pub max_concurrent_quotes: usize,
}

fn default_quote_timeout_ms() -> u64 {
	5000
}

fn default_quote_validity_secs() -> u64 {
	30
}

fn default_max_concurrent_quotes() -> usize {
	64
}

impl Default for QuoteConfig {
	fn default() -> Self {
		Self {
			quote_timeout_ms: default_quote_timeout_ms(),
			quote_validity_secs: default_quote_validity_secs(),
			max_concurrent_quotes: default_max_concurrent_quotes(),
		}
	}
}

impl QuoteConfig {
	pub fn quote_timeout(&self) -> Duration {
		Duration::from_millis(self.quote_timeout_ms)
	}

	pub fn quote_validity(&self) -> Duration {
		Duration::from_secs(self.quote_validity_secs)
	}
}
