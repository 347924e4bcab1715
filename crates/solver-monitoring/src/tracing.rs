use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Error, Debug)]
pub enum TracingError {
	#[error("Invalid log filter '{0}': {1}")]
	Filter(String, String),

	#[error("Failed to initialize tracing: {0}")]
	Init(String),
}

/// Output format of the log layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
}

impl fmt::Display for LogFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LogFormat::Pretty => write!(f, "pretty"),
			LogFormat::Json => write!(f, "json"),
		}
	}
}

impl FromStr for LogFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"pretty" | "text" => Ok(LogFormat::Pretty),
			"json" => Ok(LogFormat::Json),
			other => Err(format!("unknown log format: {}", other)),
		}
	}
}

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
	/// Filter directive used when `RUST_LOG` is unset, e.g. `info` or
	/// `info,solver_discovery=debug`.
	pub level: String,
	pub format: LogFormat,
	pub with_thread_ids: bool,
	pub with_file_and_line: bool,
	pub with_target: bool,
	pub with_span_events: FmtSpan,
}

impl Default for TracingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
			with_thread_ids: false,
			with_file_and_line: false,
			with_target: true,
			with_span_events: FmtSpan::NONE,
		}
	}
}

impl TracingConfig {
	pub fn new(level: impl Into<String>, format: LogFormat) -> Self {
		Self {
			level: level.into(),
			format,
			..Self::default()
		}
	}

	pub fn with_level(mut self, level: impl Into<String>) -> Self {
		self.level = level.into();
		self
	}

	pub fn with_format(mut self, format: LogFormat) -> Self {
		self.format = format;
		self
	}

	pub fn debug() -> Self {
		Self {
			level: "debug".to_string(),
			with_thread_ids: true,
			with_file_and_line: true,
			with_span_events: FmtSpan::ENTER | FmtSpan::CLOSE,
			..Self::default()
		}
	}

	pub fn production() -> Self {
		Self {
			format: LogFormat::Json,
			with_target: false,
			..Self::default()
		}
	}

	/// Builds the filter. `RUST_LOG` takes precedence over `level`.
	pub fn env_filter(&self) -> Result<EnvFilter, TracingError> {
		match EnvFilter::try_from_default_env() {
			Ok(filter) => Ok(filter),
			Err(_) => EnvFilter::try_new(&self.level)
				.map_err(|e| TracingError::Filter(self.level.clone(), e.to_string())),
		}
	}
}

/// Initialize tracing with the given configuration
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
	let filter = config.env_filter()?;
	let subscriber = tracing_subscriber::registry().with(filter);

	match config.format {
		LogFormat::Json => {
			let json_layer = tracing_subscriber::fmt::layer()
				.json()
				.with_span_events(config.with_span_events)
				.with_thread_ids(config.with_thread_ids)
				.with_file(config.with_file_and_line)
				.with_line_number(config.with_file_and_line)
				.with_target(config.with_target);

			subscriber
				.with(json_layer)
				.try_init()
				.map_err(|e| TracingError::Init(e.to_string()))?;
		}
		LogFormat::Pretty => {
			let fmt_layer = tracing_subscriber::fmt::layer()
				.pretty()
				.with_span_events(config.with_span_events)
				.with_thread_ids(config.with_thread_ids)
				.with_file(config.with_file_and_line)
				.with_line_number(config.with_file_and_line)
				.with_target(config.with_target);

			subscriber
				.with(fmt_layer)
				.try_init()
				.map_err(|e| TracingError::Init(e.to_string()))?;
		}
	}

	info!(
		"Tracing initialized with level '{}' ({} format)",
		config.level, config.format
	);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_log_format_parsing() {
		assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
		assert_eq!(" Pretty ".parse::<LogFormat>(), Ok(LogFormat::Pretty));
		assert!("xml".parse::<LogFormat>().is_err());

		let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
		assert_eq!(format, LogFormat::Json);
	}

	#[test]
	fn test_invalid_level_is_rejected() {
		let config = TracingConfig::default().with_level("solver=loud");
		if std::env::var("RUST_LOG").is_err() {
			assert!(matches!(config.env_filter(), Err(TracingError::Filter(..))));
		}
	}

	#[test]
	fn test_presets() {
		assert_eq!(TracingConfig::production().format, LogFormat::Json);
		assert_eq!(TracingConfig::debug().level, "debug");
		assert_eq!(
			TracingConfig::new("warn", LogFormat::Json).with_format(LogFormat::Pretty).format,
			LogFormat::Pretty
		);
	}
}
