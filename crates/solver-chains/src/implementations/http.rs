//! Remote liquidity adapter.
//!
//! Delegates liquidity discovery to an HTTP service (an aggregator, indexer or
//! chain-specific quoting API). The remote endpoint is expected to expose:
//!
//! - `GET {base_url}/liquidity?sourceToken=..&destinationToken=..&destinationChain=..&amount=..`
//!   returning `{"sources": [LiquiditySource, ...]}`
//! - `GET {base_url}/health` returning any 2xx status when healthy
//!
//! Transient failures are retried with exponential backoff; 4xx responses and
//! malformed bodies fail immediately.

use crate::{adapter::ChainAdapter, utils::RetryPolicy};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use solver_types::{AdapterError, AdapterResult, ChainId, LiquiditySource, TokenRef, U256};
use std::time::Duration;
use tracing::{debug, warn};

fn default_timeout_ms() -> u64 {
	2000
}

fn default_max_retries() -> u32 {
	2
}

fn default_retry_delay_ms() -> u64 {
	100
}

/// Configuration for [`HttpAdapter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpAdapterConfig {
	pub base_url: String,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default = "default_max_retries")]
	pub max_retries: u32,
	#[serde(default = "default_retry_delay_ms")]
	pub retry_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
struct LiquidityResponse {
	sources: Vec<LiquiditySource>,
}

/// Adapter backed by a remote liquidity API.
#[derive(Debug)]
pub struct HttpAdapter {
	chain_id: ChainId,
	name: String,
	base_url: String,
	client: Client,
	retry: RetryPolicy,
}

impl HttpAdapter {
	pub fn new(chain_id: ChainId, config: HttpAdapterConfig) -> AdapterResult<Self> {
		let client = Client::builder()
			.timeout(Duration::from_millis(config.timeout_ms))
			.build()
			.map_err(|e| AdapterError::Unavailable(format!("failed to build client: {}", e)))?;

		let retry = RetryPolicy::new(
			Duration::from_millis(config.retry_delay_ms),
			Duration::from_millis(config.timeout_ms.saturating_mul(2)),
		)
		.with_max_retries(config.max_retries);

		Ok(Self {
			chain_id,
			name: config
				.name
				.unwrap_or_else(|| format!("{}-http", chain_id)),
			base_url: config.base_url.trim_end_matches('/').to_string(),
			client,
			retry,
		})
	}

	async fn fetch_sources(
		&self,
		source_token: &TokenRef,
		destination_token: &TokenRef,
		amount: U256,
	) -> AdapterResult<Vec<LiquiditySource>> {
		let url = format!("{}/liquidity", self.base_url);
		let amount = amount.to_string();
		let destination_chain = destination_token.chain_id.to_string();

		let response = self
			.client
			.get(&url)
			.query(&[
				("sourceToken", source_token.address.as_str()),
				("destinationToken", destination_token.address.as_str()),
				("destinationChain", destination_chain.as_str()),
				("amount", amount.as_str()),
			])
			.send()
			.await
			.map_err(|e| AdapterError::Network(e.to_string()))?;

		let status = response.status();
		if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
			return Err(AdapterError::Unavailable(format!("{} returned {}", url, status)));
		}
		if !status.is_success() {
			return Err(AdapterError::InvalidResponse(format!(
				"{} returned {}",
				url, status
			)));
		}

		let body: LiquidityResponse = response
			.json()
			.await
			.map_err(|e| AdapterError::InvalidResponse(e.to_string()))?;

		Ok(body.sources)
	}
}

#[async_trait]
impl ChainAdapter for HttpAdapter {
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

		let sources = self
			.retry
			.run("liquidity request", || {
				self.fetch_sources(source_token, destination_token, amount)
			})
			.await?;

		let (valid, invalid): (Vec<_>, Vec<_>) = sources
			.into_iter()
			.partition(|s| s.confidence <= 100 && !s.input_amount.is_zero());
		if !invalid.is_empty() {
			warn!(
				"{} discarded {} malformed liquidity sources",
				self.name,
				invalid.len()
			);
		}

		debug!("{} returned {} sources", self.name, valid.len());
		Ok(valid)
	}

	async fn health_check(&self) -> AdapterResult<bool> {
		let response = self
			.client
			.get(format!("{}/health", self.base_url))
			.send()
			.await
			.map_err(|e| AdapterError::Network(e.to_string()))?;
		Ok(response.status().is_success())
	}
}
