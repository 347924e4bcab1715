// solver-core/src/quote_generator.rs

use crate::{config::QuoteConfig, stats::QuoteStats};
use arc_swap::ArcSwapOption;
use solver_chains::AdapterTable;
use solver_liquidity::Router;
use solver_pricing::Pricer;
use solver_types::{now_ms, Quote, QuoteRequest, Result, SolverError};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

/// Single entry point for turning a quote request into a quote.
///
/// Routing and pricing run under a hard deadline, and at most
/// `max_concurrent_quotes` computations run at once. Waiting for a slot counts
/// against the deadline. Concurrent calls share only the statistics, which are
/// updated under one lock per completion.
#[derive(Debug)]
pub struct QuoteGenerator {
	config: QuoteConfig,
	router: Router,
	pricer: Pricer,
	adapters: ArcSwapOption<AdapterTable>,
	permits: Semaphore,
	stats: Mutex<QuoteStats>,
}

impl QuoteGenerator {
	pub fn new(config: QuoteConfig, router: Router, pricer: Pricer) -> Self {
		let permits = Semaphore::new(config.max_concurrent_quotes.min(Semaphore::MAX_PERMITS));
		Self {
			config,
			router,
			pricer,
			adapters: ArcSwapOption::empty(),
			permits,
			stats: Mutex::new(QuoteStats::default()),
		}
	}

	/// Installs the adapter table. Later calls replace it atomically.
	pub fn initialize(&self, adapters: AdapterTable) {
		info!(
			"Quote generator initialized with adapters for {:?}",
			adapters.chains()
		);
		self.adapters.store(Some(Arc::new(adapters)));
	}

	pub fn is_initialized(&self) -> bool {
		self.adapters.load().is_some()
	}

	pub fn config(&self) -> &QuoteConfig {
		&self.config
	}

	/// Produces a quote within `quote_timeout_ms` of the call or fails.
	///
	/// Adapter calls still in flight when the deadline passes are dropped with
	/// the computation; their results can never surface later.
	#[instrument(skip_all, fields(
		request_id = %request.id,
		source = %request.source_chain,
		destination = %request.destination_chain,
	))]
	pub async fn generate_quote(&self, request: &QuoteRequest) -> Result<Quote> {
		let started = Instant::now();
		let result = self.generate(request).await;

		match &result {
			Ok(quote) => {
				debug!(
					"Generated quote for {} in {:?} over {} hops",
					request.id,
					started.elapsed(),
					quote.route.len()
				);
				self.with_stats(|stats| stats.record_success(started.elapsed(), now_ms()));
			}
			Err(e) => {
				warn!("No quote for {}: {}", request.id, e);
				self.with_stats(|stats| stats.record_failure(e));
			}
		}

		result
	}

	async fn generate(&self, request: &QuoteRequest) -> Result<Quote> {
		validate_request(request)?;

		let adapters = self.adapters.load_full().ok_or(SolverError::NotInitialized)?;

		let work = async {
			// The semaphore is never closed.
			let _permit = self
				.permits
				.acquire()
				.await
				.map_err(|_| SolverError::NotInitialized)?;
			self.compute(&adapters, request).await
		};

		match tokio::time::timeout(self.config.quote_timeout(), work).await {
			Ok(result) => result,
			Err(_) => Err(SolverError::Timeout(self.config.quote_timeout_ms)),
		}
	}

	async fn compute(&self, adapters: &AdapterTable, request: &QuoteRequest) -> Result<Quote> {
		let route = self
			.router
			.determine_route(request.source_chain, request.destination_chain)?;

		let liquidity = self
			.router
			.collect_liquidity(
				adapters,
				&route,
				&request.source_token,
				&request.destination_token,
				request.source_amount,
			)
			.await?;

		self.pricer.price(request, &liquidity)
	}

	/// Snapshot of the running statistics.
	pub fn get_stats(&self) -> QuoteStats {
		self.stats
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.clone()
	}

	fn with_stats(&self, update: impl FnOnce(&mut QuoteStats)) {
		let mut stats = self
			.stats
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner());
		update(&mut stats);
	}
}

/// Rejects requests that can never be priced, before any adapter is queried.
pub fn validate_request(request: &QuoteRequest) -> Result<()> {
	if request.id.trim().is_empty() {
		return Err(SolverError::Validation("request id is empty".into()));
	}
	if request.source_amount.is_zero() {
		return Err(SolverError::Validation(
			"source amount must be positive".into(),
		));
	}
	if request.source_token.chain_id != request.source_chain {
		return Err(SolverError::Validation(format!(
			"source token {} is not on {}",
			request.source_token, request.source_chain
		)));
	}
	if request.destination_token.chain_id != request.destination_chain {
		return Err(SolverError::Validation(format!(
			"destination token {} is not on {}",
			request.destination_token, request.destination_chain
		)));
	}
	if request.source_token == request.destination_token {
		return Err(SolverError::Validation(format!(
			"source and destination are both {}",
			request.source_token
		)));
	}
	Ok(())
}
