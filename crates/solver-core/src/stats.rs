use serde::Serialize;
use solver_types::{SolverError, TimestampMs};
use std::time::Duration;

/// Running quote generation counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuoteStats {
	pub quotes_generated: u64,
	pub quotes_failed: u64,
	pub quotes_timed_out: u64,
	pub validation_failures: u64,
	/// Mean generation time over successful quotes.
	pub average_generation_ms: f64,
	pub last_generated_at: Option<TimestampMs>,
}

impl QuoteStats {
	pub(crate) fn record_success(&mut self, elapsed: Duration, at: TimestampMs) {
		self.quotes_generated += 1;
		let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
		self.average_generation_ms +=
			(elapsed_ms - self.average_generation_ms) / self.quotes_generated as f64;
		self.last_generated_at = Some(at);
	}

	pub(crate) fn record_failure(&mut self, error: &SolverError) {
		match error {
			SolverError::Validation(_) => self.validation_failures += 1,
			SolverError::Timeout(_) => self.quotes_timed_out += 1,
			_ => self.quotes_failed += 1,
		}
	}

	/// Requests that ended without a quote.
	pub fn total_failures(&self) -> u64 {
		self.quotes_failed + self.quotes_timed_out + self.validation_failures
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_running_average() {
		let mut stats = QuoteStats::default();
		stats.record_success(Duration::from_millis(10), 1);
		stats.record_success(Duration::from_millis(20), 2);
		stats.record_success(Duration::from_millis(30), 3);

		assert_eq!(stats.quotes_generated, 3);
		assert!((stats.average_generation_ms - 20.0).abs() < 1e-9);
		assert_eq!(stats.last_generated_at, Some(3));
	}

	#[test]
	fn test_failures_are_classified() {
		let mut stats = QuoteStats::default();
		stats.record_failure(&SolverError::Validation("bad".into()));
		stats.record_failure(&SolverError::Timeout(5));
		stats.record_failure(&SolverError::ZeroConfidence);
		stats.record_failure(&SolverError::Uneconomic("fee exceeds amount".into()));

		assert_eq!(stats.validation_failures, 1);
		assert_eq!(stats.quotes_timed_out, 1);
		assert_eq!(stats.quotes_failed, 2);
		assert_eq!(stats.total_failures(), 4);
		assert_eq!(stats.quotes_generated, 0);
	}
}
