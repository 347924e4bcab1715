// solver-discovery/src/lib.rs

//! # Solver Discovery Library
//!
//! Discovers quote intents by holding a websocket connection to the upstream
//! intent source. The [`IntentListener`] turns inbound `quote_request`
//! messages into [`solver_types::ListenerEvent`]s and sends quote responses
//! back over the same connection.

pub mod config;
pub mod error;
pub mod listener;

pub use config::ListenerConfig;
pub use error::ListenerError;
pub use listener::{ConnectionState, IntentListener, ListenerStatus};
