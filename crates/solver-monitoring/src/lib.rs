//! Observability for the solver.
//!
//! Installs the global `tracing` subscriber: an [`EnvFilter`] built from
//! `RUST_LOG` or the configured level, and a pretty or JSON formatting layer.
//!
//! [`EnvFilter`]: tracing_subscriber::EnvFilter

pub mod tracing;

pub use crate::tracing::{init_tracing, LogFormat, TracingConfig, TracingError};
