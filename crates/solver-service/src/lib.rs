//! Service layer of the solver.
//!
//! Connects the intent listener to the quote generator and exposes status
//! endpoints. The `oif-solver` binary is a thin wrapper around
//! [`service::SolverService`].
//!
//! # Components
//!
//! - `api`: `/health` and `/status` endpoints
//! - `cli`: command-line interface
//! - `service`: wiring, request dispatch and shutdown

pub mod api;
pub mod cli;
pub mod service;

pub use service::SolverService;
