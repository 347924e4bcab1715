//! Route pricing for the solver.
//!
//! Turns the liquidity gathered for each hop of a route into a quote: the
//! composed destination amount, the route's confidence (its weakest hop), the
//! urgency-scaled solver fee, price impact and the resolver safety deposit.

pub mod config;
pub mod pricer;

pub use config::{PricingConfig, UrgencyMultipliers};
pub use pricer::Pricer;
