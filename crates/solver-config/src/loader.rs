//! Configuration loading from files and environment.

use crate::{types::SolverConfig, ConfigError};
use regex::Regex;
use solver_chains::AdapterTable;
use solver_liquidity::Router;
use std::{
	env,
	path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Serialization format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
	Toml,
	Json,
	Yaml,
}

impl ConfigFormat {
	/// Picks the format from the file extension.
	pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Ok(ConfigFormat::Toml),
			Some("json") => Ok(ConfigFormat::Json),
			Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
			_ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
		}
	}
}

/// Configuration loader with environment variable substitution
#[derive(Debug, Clone)]
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "SOLVER_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	/// Loads, overrides and validates the configuration file.
	pub async fn load(&self) -> Result<SolverConfig, ConfigError> {
		let file_path = self.file_path.as_ref().ok_or_else(|| {
			ConfigError::FileNotFound("No configuration file specified".to_string())
		})?;
		info!("Loading configuration from {}", file_path.display());

		let format = ConfigFormat::from_path(file_path)?;
		let content = tokio::fs::read_to_string(file_path)
			.await
			.map_err(|e| match e.kind() {
				std::io::ErrorKind::NotFound => {
					ConfigError::FileNotFound(file_path.display().to_string())
				}
				_ => ConfigError::IoError(e),
			})?;

		let mut config = self.parse(&content, format)?;
		self.apply_env_overrides(&mut config)?;
		Self::validate(&config)?;

		Ok(config)
	}

	/// Parses configuration text after `${VAR}` substitution.
	pub fn parse(&self, content: &str, format: ConfigFormat) -> Result<SolverConfig, ConfigError> {
		let content = self.substitute_env_vars(content)?;
		match format {
			ConfigFormat::Toml => {
				toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
			}
			ConfigFormat::Json => {
				serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
			}
			ConfigFormat::Yaml => {
				serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
			}
		}
	}

	fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
		let mut result = content.to_string();

		// Find and replace ${VAR_NAME} patterns
		let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;

		for cap in re.captures_iter(content) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let env_value = env::var(var_name)
				.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			result = result.replace(full_match, &env_value);
		}

		Ok(result)
	}

	fn env_override(&self, key: &str) -> Option<String> {
		env::var(format!("{}{}", self.env_prefix, key)).ok()
	}

	fn apply_env_overrides(&self, config: &mut SolverConfig) -> Result<(), ConfigError> {
		if let Some(log_level) = self.env_override("LOG_LEVEL") {
			debug!("Overriding log level from environment");
			config.solver.log_level = log_level;
		}

		if let Some(url) = self.env_override("LISTENER_URL") {
			debug!("Overriding listener URL from environment");
			config.listener.url = url;
		}

		if let Some(timeout) = self.env_override("QUOTE_TIMEOUT_MS") {
			config.quotes.quote_timeout_ms = timeout.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid quote timeout: {}", e))
			})?;
		}

		if let Some(http_port) = self.env_override("HTTP_PORT") {
			config.solver.http_port = http_port
				.parse()
				.map_err(|e| ConfigError::ValidationError(format!("Invalid HTTP port: {}", e)))?;
		}

		Ok(())
	}

	/// Checks cross-field constraints the component configs cannot express
	/// on their own.
	pub fn validate(config: &SolverConfig) -> Result<(), ConfigError> {
		let invalid = |msg: String| Err(ConfigError::ValidationError(msg));

		let url = &config.listener.url;
		if !(url.starts_with("ws://") || url.starts_with("wss://")) {
			return invalid(format!("listener url must use ws:// or wss://, got {}", url));
		}
		if config.listener.heartbeat_interval_ms == 0 {
			return invalid("listener heartbeat_interval_ms must be positive".to_string());
		}
		if config.listener.heartbeat_timeout_ms < config.listener.heartbeat_interval_ms {
			return invalid(
				"listener heartbeat_timeout_ms must not be shorter than heartbeat_interval_ms"
					.to_string(),
			);
		}
		if config.listener.reconnect_initial_delay_ms > config.listener.reconnect_max_delay_ms {
			return invalid(
				"listener reconnect_initial_delay_ms exceeds reconnect_max_delay_ms".to_string(),
			);
		}

		if config.quotes.quote_timeout_ms == 0 {
			return invalid("quotes quote_timeout_ms must be positive".to_string());
		}
		if config.quotes.quote_validity_secs == 0 {
			return invalid("quotes quote_validity_secs must be positive".to_string());
		}
		if config.quotes.max_concurrent_quotes == 0 {
			return invalid("quotes max_concurrent_quotes must be positive".to_string());
		}

		config
			.pricing
			.validate()
			.map_err(|e| ConfigError::ValidationError(e.to_string()))?;

		Router::new(config.routing.clone())
			.map_err(|e| ConfigError::ValidationError(e.to_string()))?;

		if config.adapters.is_empty() {
			return invalid("At least one chain adapter must be configured".to_string());
		}
		AdapterTable::from_configs(&config.adapters)
			.map_err(|e| ConfigError::ValidationError(e.to_string()))?;

		Ok(())
	}
}
