//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "oif-solver")]
#[command(about = "Cross-chain quoting solver", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
	/// Path to configuration file
	#[arg(short, long, env = "CONFIG_FILE", default_value = "config/local.toml")]
	pub config: PathBuf,

	/// Log level override (trace, debug, info, warn, error)
	#[arg(short, long, env = "SOLVER_LOG_LEVEL")]
	pub log_level: Option<String>,

	/// Subcommand to execute
	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
	/// Connect to the intent source and serve quotes
	Start,
	/// Validate the configuration file and exit
	Validate,
}

impl Args {
	pub fn command(&self) -> Command {
		self.command.unwrap_or(Command::Start)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_start_is_the_default_command() {
		let args = Args::parse_from(["oif-solver", "--config", "solver.toml"]);
		assert_eq!(args.command(), Command::Start);
		assert_eq!(args.config, PathBuf::from("solver.toml"));
	}

	#[test]
	fn test_validate_with_log_level() {
		let args = Args::parse_from(["oif-solver", "--log-level", "debug", "validate"]);
		assert_eq!(args.command(), Command::Validate);
		assert_eq!(args.log_level.as_deref(), Some("debug"));
	}
}
