use crate::quotes::QuoteRequest;
use std::time::Duration;

/// Events emitted by the intent listener to the surrounding service.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenerEvent {
	Connected,
	Disconnected { reason: String },
	Reconnecting { attempt: u32, delay: Duration },
	QuoteRequested(QuoteRequest),
	QuoteSubmitted { request_id: String },
	MessageRejected { reason: String },
	Stopped,
}

impl ListenerEvent {
	pub fn name(&self) -> &'static str {
		match self {
			ListenerEvent::Connected => "connected",
			ListenerEvent::Disconnected { .. } => "disconnected",
			ListenerEvent::Reconnecting { .. } => "reconnecting",
			ListenerEvent::QuoteRequested(_) => "quote_requested",
			ListenerEvent::QuoteSubmitted { .. } => "quote_submitted",
			ListenerEvent::MessageRejected { .. } => "message_rejected",
			ListenerEvent::Stopped => "stopped",
		}
	}
}
