//! Chain adapters for discovering liquidity on different blockchains.
//!
//! This crate provides a uniform interface for asking a chain family "what
//! would converting this amount of token A into token B yield?" through the
//! `ChainAdapter` trait, so that routing and pricing stay chain-agnostic.
//!
//! # Architecture
//!
//! - `adapter`: the `ChainAdapter` trait
//! - `registry`: the `AdapterTable`, a fixed lookup table indexed by chain
//! - `utils`: retry logic for network-backed adapters
//! - `implementations`: concrete adapters (`pool`, `http`)

pub mod adapter;
pub mod implementations;
pub mod registry;
pub mod utils;

pub use adapter::ChainAdapter;
pub use implementations::{build_adapter, AdapterConfig, HttpAdapter, PoolAdapter};
pub use registry::AdapterTable;
