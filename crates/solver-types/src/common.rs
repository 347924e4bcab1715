//! Common types used throughout the solver system.

use std::sync::atomic::{AtomicU64, Ordering};

pub use alloy_primitives::U256;

/// Timestamp (Unix milliseconds)
pub type TimestampMs = u64;

/// Basis-point denominator.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Current wall-clock time in Unix milliseconds.
pub fn now_ms() -> TimestampMs {
	chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// Millisecond clock that never goes backwards.
///
/// Each call to [`MonotonicClock::next`] returns a value strictly greater than
/// the previous one, even when the wall clock stalls or is adjusted.
#[derive(Debug, Default)]
pub struct MonotonicClock {
	last: AtomicU64,
}

impl MonotonicClock {
	pub const fn new() -> Self {
		Self {
			last: AtomicU64::new(0),
		}
	}

	pub fn next(&self) -> TimestampMs {
		let now = now_ms();
		let mut last = self.last.load(Ordering::Relaxed);
		loop {
			let candidate = now.max(last + 1);
			match self.last.compare_exchange_weak(
				last,
				candidate,
				Ordering::AcqRel,
				Ordering::Relaxed,
			) {
				Ok(_) => return candidate,
				Err(observed) => last = observed,
			}
		}
	}
}

/// Rescales an amount between two decimal precisions.
///
/// Scaling down truncates. Returns `None` on overflow.
pub fn rescale_amount(amount: U256, from_decimals: u8, to_decimals: u8) -> Option<U256> {
	let ten = U256::from(10u64);
	if to_decimals >= from_decimals {
		let factor = ten.checked_pow(U256::from(to_decimals - from_decimals))?;
		amount.checked_mul(factor)
	} else {
		let factor = ten.checked_pow(U256::from(from_decimals - to_decimals))?;
		amount.checked_div(factor)
	}
}

/// Serde helpers for `U256` amounts carried as decimal strings.
///
/// Integers are accepted on input for convenience; output is always a string
/// so that 256-bit values survive JSON consumers with 53-bit numbers.
pub mod u256_decimal {
	use super::U256;
	use serde::{de, Deserialize, Deserializer, Serializer};
	use std::str::FromStr;

	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Text(String),
		Number(u64),
	}

	pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&value.to_string())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
		match Raw::deserialize(deserializer)? {
			Raw::Number(n) => Ok(U256::from(n)),
			Raw::Text(text) => {
				let trimmed = text.trim();
				if trimmed.is_empty() || trimmed.starts_with('-') {
					return Err(de::Error::custom(format!("invalid amount: {:?}", text)));
				}
				U256::from_str(trimmed)
					.map_err(|e| de::Error::custom(format!("invalid amount {:?}: {}", text, e)))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde::{Deserialize, Serialize};

	#[derive(Debug, Serialize, Deserialize)]
	struct Wrapper {
		#[serde(with = "u256_decimal")]
		amount: U256,
	}

	#[test]
	fn test_monotonic_clock_strictly_increases() {
		let clock = MonotonicClock::new();
		let mut previous = clock.next();
		for _ in 0..1000 {
			let current = clock.next();
			assert!(current > previous);
			previous = current;
		}
	}

	#[test]
	fn test_u256_decimal_accepts_strings_and_numbers() {
		let from_string: Wrapper =
			serde_json::from_str(r#"{"amount":"1000000000000000000"}"#).unwrap();
		assert_eq!(from_string.amount, U256::from(1_000_000_000_000_000_000u128));

		let from_number: Wrapper = serde_json::from_str(r#"{"amount":42}"#).unwrap();
		assert_eq!(from_number.amount, U256::from(42u64));

		let out = serde_json::to_string(&from_number).unwrap();
		assert_eq!(out, r#"{"amount":"42"}"#);
	}

	#[test]
	fn test_u256_decimal_rejects_negative_and_garbage() {
		assert!(serde_json::from_str::<Wrapper>(r#"{"amount":"-5"}"#).is_err());
		assert!(serde_json::from_str::<Wrapper>(r#"{"amount":"abc"}"#).is_err());
		assert!(serde_json::from_str::<Wrapper>(r#"{"amount":-5}"#).is_err());
	}

	#[test]
	fn test_rescale_amount() {
		let one_eth = U256::from(1_000_000_000_000_000_000u128);
		assert_eq!(rescale_amount(one_eth, 18, 6), Some(U256::from(1_000_000u64)));
		assert_eq!(
			rescale_amount(U256::from(1_000_000u64), 6, 18),
			Some(one_eth)
		);
		assert_eq!(rescale_amount(U256::from(7u64), 8, 8), Some(U256::from(7u64)));
	}
}
