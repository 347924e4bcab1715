use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for the intent listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerConfig {
	/// Websocket endpoint of the intent source (`ws://` or `wss://`).
	#[serde(default = "default_url")]
	pub url: String,
	#[serde(default = "default_connect_timeout_ms")]
	pub connect_timeout_ms: u64,
	#[serde(default = "default_heartbeat_interval_ms")]
	pub heartbeat_interval_ms: u64,
	/// Silence after which the connection is considered dead.
	#[serde(default = "default_heartbeat_timeout_ms")]
	pub heartbeat_timeout_ms: u64,
	#[serde(default = "default_reconnect_initial_delay_ms")]
	pub reconnect_initial_delay_ms: u64,
	#[serde(default = "default_reconnect_max_delay_ms")]
	pub reconnect_max_delay_ms: u64,
	/// Consecutive failed connection attempts tolerated before giving up.
	#[serde(default = "default_max_reconnects")]
	pub max_reconnects: u32,
	#[serde(default = "default_buffer_size")]
	pub event_buffer_size: usize,
	#[serde(default = "default_buffer_size")]
	pub outbound_buffer_size: usize,
}

fn default_url() -> String {
	"ws://127.0.0.1:8080/solver".to_string()
}

fn default_connect_timeout_ms() -> u64 {
	10_000
}

fn default_heartbeat_interval_ms() -> u64 {
	15_000
}

fn default_heartbeat_timeout_ms() -> u64 {
	45_000
}

fn default_reconnect_initial_delay_ms() -> u64 {
	500
}

fn default_reconnect_max_delay_ms() -> u64 {
	30_000
}

fn default_max_reconnects() -> u32 {
	10
}

fn default_buffer_size() -> usize {
	1024
}

impl Default for ListenerConfig {
	fn default() -> Self {
		Self {
			url: default_url(),
			connect_timeout_ms: default_connect_timeout_ms(),
			heartbeat_interval_ms: default_heartbeat_interval_ms(),
			heartbeat_timeout_ms: default_heartbeat_timeout_ms(),
			reconnect_initial_delay_ms: default_reconnect_initial_delay_ms(),
			reconnect_max_delay_ms: default_reconnect_max_delay_ms(),
			max_reconnects: default_max_reconnects(),
			event_buffer_size: default_buffer_size(),
			outbound_buffer_size: default_buffer_size(),
		}
	}
}

impl ListenerConfig {
	pub fn connect_timeout(&self) -> Duration {
		Duration::from_millis(self.connect_timeout_ms)
	}

	pub fn heartbeat_interval(&self) -> Duration {
		Duration::from_millis(self.heartbeat_interval_ms)
	}

	pub fn heartbeat_timeout(&self) -> Duration {
		Duration::from_millis(self.heartbeat_timeout_ms)
	}

	pub fn reconnect_initial_delay(&self) -> Duration {
		Duration::from_millis(self.reconnect_initial_delay_ms)
	}

	pub fn reconnect_max_delay(&self) -> Duration {
		Duration::from_millis(self.reconnect_max_delay_ms)
	}
}
