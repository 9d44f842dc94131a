//! Destination rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! matched rule + inbound request
//!     → destination.rs (path preservation, query merge, scheme upgrade)
//!     → trailing_slash.rs (normalize request or destination path)
//!     → Location header value
//! ```

pub mod destination;
pub mod trailing_slash;

pub use destination::build_destination;
pub use trailing_slash::{appears_to_be_file, normalize};
