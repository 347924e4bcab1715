//! Liquidity routing for the solver.
//!
//! This crate decides how an intent travels between chains and gathers the
//! liquidity each step of that journey can offer.
//!
//! # Key Responsibilities
//!
//! - Hop topology selection (direct swap, swap + bridge, hub routes)
//! - Per-hop token planning through configured bridge assets
//! - Concurrent liquidity collection from chain adapters

pub mod config;
pub mod router;

pub use config::{BridgeRoute, RoutingConfig};
pub use router::{Leg, Router};
