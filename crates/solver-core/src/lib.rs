//! Core quote generation for the solver.
//!
//! The [`QuoteGenerator`] validates a request, asks the router for a route and
//! its liquidity, prices the result, and enforces the per-quote deadline.

pub mod config;
pub mod quote_generator;
pub mod stats;

pub use config::QuoteConfig;
pub use quote_generator::{validate_request, QuoteGenerator};
pub use stats::QuoteStats;
