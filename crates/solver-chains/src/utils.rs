//! Utility functions and types for chain adapters.
//!
//! This module provides reusable components for adapter implementations,
//! most importantly retry logic for remote liquidity calls.

use backoff::{backoff::Backoff, ExponentialBackoff};
use solver_types::{AdapterError, AdapterResult};
use std::{future::Future, time::Duration};
use tracing::warn;

/// Retry policy for adapter network calls.
///
/// Transient failures (`Network`, `Unavailable`) are retried with exponential
/// backoff; every other adapter error is returned immediately.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
	backoff: ExponentialBackoff,
	max_retries: u32,
}

impl RetryPolicy {
	/// Creates a policy whose first retry waits `initial_delay`.
	///
	/// Retries stop after `max_elapsed` regardless of the attempt count.
	pub fn new(initial_delay: Duration, max_elapsed: Duration) -> Self {
		let backoff = ExponentialBackoff {
			initial_interval: initial_delay,
			current_interval: initial_delay,
			max_interval: max_elapsed,
			max_elapsed_time: Some(max_elapsed),
			..Default::default()
		};

		Self {
			backoff,
			max_retries: 3,
		}
	}

	/// Sets the maximum number of retry attempts.
	pub fn with_max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = max_retries;
		self
	}

	pub fn max_retries(&self) -> u32 {
		self.max_retries
	}

	/// Runs `operation` until it succeeds, fails permanently, or the retry budget is spent.
	pub async fn run<T, F, Fut>(&self, operation_name: &str, mut operation: F) -> AdapterResult<T>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = AdapterResult<T>>,
	{
		let mut backoff = self.backoff.clone();
		backoff.reset();
		let mut attempts = 0;

		loop {
			match operation().await {
				Ok(result) => return Ok(result),
				Err(e) if !is_transient(&e) => return Err(e),
				Err(e) => {
					attempts += 1;

					if attempts > self.max_retries {
						warn!(
							"{} failed after {} attempts, giving up: {}",
							operation_name, attempts, e
						);
						return Err(e);
					}

					if let Some(delay) = backoff.next_backoff() {
						warn!(
							"{} failed, attempt {}/{}, retrying in {:?}: {}",
							operation_name, attempts, self.max_retries, delay, e
						);
						tokio::time::sleep(delay).await;
					} else {
						warn!(
							"{} failed, backoff exhausted after {} attempts: {}",
							operation_name, attempts, e
						);
						return Err(e);
					}
				}
			}
		}
	}
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(Duration::from_millis(100), Duration::from_secs(5))
	}
}

fn is_transient(error: &AdapterError) -> bool {
	matches!(
		error,
		AdapterError::Network(_) | AdapterError::Unavailable(_)
	)
}
