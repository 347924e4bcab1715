use thiserror::Error;

/// Errors surfaced by the intent listener.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenerError {
	/// The server rejected the websocket upgrade or the URL is unusable.
	#[error("Handshake failed: {0}")]
	Handshake(String),

	#[error("Gave up after {0} failed connection attempts")]
	ReconnectsExhausted(u32),

	#[error("Not connected")]
	NotConnected,

	#[error("No request {0} is awaiting a quote")]
	UnknownRequest(String),

	#[error("Outbound queue is full")]
	QueueFull,

	#[error("Listener stopped")]
	Stopped,

	#[error("Serialization error: {0}")]
	Serialization(String),
}

impl ListenerError {
	/// True when retrying the connection cannot help.
	pub fn is_fatal(&self) -> bool {
		matches!(
			self,
			ListenerError::Handshake(_) | ListenerError::ReconnectsExhausted(_)
		)
	}
}
