// solver-config/src/lib.rs

//! Configuration loading for the solver.
//!
//! Reads a TOML, JSON or YAML file, substitutes `${VAR}` placeholders from
//! the environment, applies `SOLVER_*` overrides and validates the result.

use thiserror::Error;

pub mod loader;
pub mod types;

pub use loader::{ConfigFormat, ConfigLoader};
pub use types::{SolverConfig, SolverSettings};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Unsupported config format: {0}")]
	UnsupportedFormat(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}
