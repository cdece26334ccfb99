//! # ld-ceremony — Ceremony State Machine
//!
//! Drives a prize drawing from setup through rolling previews to confirmed
//! results, on top of the allocation engine in `ld-draw`.
//!
//! ## Lifecycle
//!
//! ```text
//! Setup ─enter─▶ Ready ─start─▶ Drawing ─stop─▶ Result ─confirm─▶ Ready
//!                  │
//!                  └─exit─▶ Setup
//! ```
//!
//! [`Ceremony`] is the synchronous session object. [`CeremonyDriver`] owns
//! one inside a single tokio task, runs the preview timer next to the
//! operator command channel, and broadcasts [`CeremonyEvent`]s.

pub mod commands;
pub mod driver;
pub mod event;
pub mod session;

pub use commands::*;
pub use driver::*;
pub use event::*;
pub use session::*;
