//! Wire envelopes exchanged with the upstream intent source.
//!
//! Every message is a JSON object `{type, id, timestamp, data}`. The envelope
//! `id` identifies the message itself and is unrelated to the quote request id
//! carried in `data`.

use crate::{
	common::{MonotonicClock, TimestampMs},
	errors::{Result, SolverError},
	quotes::{Quote, QuoteRequest},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
	QuoteRequest,
	QuoteResponse,
	Heartbeat,
	Ping,
	#[serde(other)]
	Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
	#[serde(rename = "type")]
	pub kind: MessageType,
	pub id: String,
	pub timestamp: TimestampMs,
	pub data: T,
}

impl Envelope<Quote> {
	/// Wraps a quote into an outbound `quote_response` envelope.
	pub fn quote_response(quote: Quote, clock: &MonotonicClock) -> Self {
		Self {
			kind: MessageType::QuoteResponse,
			id: uuid::Uuid::new_v4().to_string(),
			timestamp: clock.next(),
			data: quote,
		}
	}
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
	QuoteRequest {
		envelope_id: String,
		timestamp: TimestampMs,
		request: QuoteRequest,
	},
	Heartbeat,
	/// Well-formed envelope of a type the solver does not consume.
	Ignored(MessageType),
}

/// Decodes an inbound text frame.
///
/// The envelope is parsed first so that unknown message types are ignored
/// rather than rejected; a `quote_request` whose payload violates the schema
/// is a validation error.
pub fn parse_inbound(text: &str) -> Result<InboundMessage> {
	// `data` may be absent on heartbeats.
	let envelope: Envelope<Option<serde_json::Value>> = serde_json::from_str(text)
		.map_err(|e| SolverError::Validation(format!("malformed envelope: {}", e)))?;

	match envelope.kind {
		MessageType::QuoteRequest => {
			let data = envelope.data.unwrap_or_default();
			let request: QuoteRequest = serde_json::from_value(data).map_err(|e| {
				SolverError::Validation(format!("malformed quote request: {}", e))
			})?;
			if request.id.trim().is_empty() {
				return Err(SolverError::Validation(
					"quote request id must not be empty".to_string(),
				));
			}
			Ok(InboundMessage::QuoteRequest {
				envelope_id: envelope.id,
				timestamp: envelope.timestamp,
				request,
			})
		}
		MessageType::Heartbeat | MessageType::Ping => Ok(InboundMessage::Heartbeat),
		other => Ok(InboundMessage::Ignored(other)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{chains::ChainId, common::U256, quotes::Hop};

	const REQUEST: &str = r#"{
		"type": "quote_request",
		"id": "env-1",
		"timestamp": 1700000000000,
		"data": {
			"id": "req-1",
			"sourceChain": "ETH",
			"destinationChain": "ETH",
			"sourceToken": {"address":"0xeeee","symbol":"ETH","decimals":18,"chainId":"ethereum"},
			"destinationToken": {"address":"0xa0b8","symbol":"USDC","decimals":6,"chainId":"ethereum"},
			"sourceAmount": "1000000000000000000",
			"metadata": {"urgency": "low"}
		}
	}"#;

	#[test]
	fn test_parse_quote_request() {
		match parse_inbound(REQUEST).unwrap() {
			InboundMessage::QuoteRequest {
				envelope_id,
				timestamp,
				request,
			} => {
				assert_eq!(envelope_id, "env-1");
				assert_eq!(timestamp, 1_700_000_000_000);
				assert_eq!(request.id, "req-1");
				assert_eq!(request.source_chain, ChainId::Ethereum);
			}
			other => panic!("unexpected message: {:?}", other),
		}
	}

	#[test]
	fn test_parse_rejects_schema_violations() {
		assert!(parse_inbound("not json").is_err());
		assert!(parse_inbound(r#"{"type":"quote_request","id":"x","timestamp":1,"data":{}}"#)
			.unwrap_err()
			.is_validation());
		let negative = REQUEST.replace("\"1000000000000000000\"", "\"-1\"");
		assert!(parse_inbound(&negative).is_err());
	}

	#[test]
	fn test_unknown_types_are_ignored() {
		let msg = r#"{"type":"order_filled","id":"x","timestamp":1,"data":null}"#;
		assert_eq!(
			parse_inbound(msg).unwrap(),
			InboundMessage::Ignored(MessageType::Unknown)
		);
		let heartbeat = r#"{"type":"heartbeat","id":"h","timestamp":1,"data":{}}"#;
		assert_eq!(parse_inbound(heartbeat).unwrap(), InboundMessage::Heartbeat);
		let bare = r#"{"type":"ping","id":"p","timestamp":2}"#;
		assert_eq!(parse_inbound(bare).unwrap(), InboundMessage::Heartbeat);
	}

	#[test]
	fn test_quote_response_envelope() {
		let clock = MonotonicClock::new();
		let quote = Quote {
			request_id: "req-1".into(),
			source_amount: U256::from(10u64),
			destination_amount: U256::from(9u64),
			route: vec![Hop::swap(ChainId::Ethereum, "uniswap-v3")],
			solver_fee: U256::from(1u64),
			confidence: 90,
			price_impact_bps: 3,
			safety_deposit: U256::ZERO,
			generated_at: 1,
			expires_at: 2,
		};
		let first = Envelope::quote_response(quote.clone(), &clock);
		let second = Envelope::quote_response(quote, &clock);
		assert_ne!(first.id, second.id);
		assert!(second.timestamp > first.timestamp);

		let value = serde_json::to_value(&first).unwrap();
		assert_eq!(value["type"], "quote_response");
		assert_eq!(value["data"]["requestId"], "req-1");
		assert_eq!(value["data"]["destinationAmount"], "9");
	}
}
