//! Shared domain types for the cross-chain quoting solver.
//!
//! Every other crate in the workspace depends on these definitions: chain
//! identifiers, token references, quote requests and quotes, the wire
//! envelope, listener events and the error taxonomy.

pub mod chains;
pub mod common;
pub mod errors;
pub mod events;
pub mod messages;
pub mod quotes;
pub mod tokens;

pub use chains::*;
pub use common::*;
pub use errors::*;
pub use events::*;
pub use messages::*;
pub use quotes::*;
pub use tokens::*;
