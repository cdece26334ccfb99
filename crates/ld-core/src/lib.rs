//! ld-core: Shared types for the lucky draw ceremony engine
//!
//! Participants, awards, the ceremony state enum and the error type used
//! across all `ld-*` crates.

mod award;
mod error;
mod participant;
mod state;

pub use award::*;
pub use error::*;
pub use participant::*;
pub use state::*;
