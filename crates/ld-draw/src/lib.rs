//! # ld-draw — Draw Allocation Engine
//!
//! Everything that decides who can win, how many win this round, and who
//! actually won, independent of the ceremony lifecycle.
//!
//! ## Architecture
//!
//! ```text
//! ParticipantPool ──available()──▶ DrawSampler ──sample(k)──▶ AwardLedger
//!        ▲                              ▲                        │
//!        │                    slots_for_round(award)             │
//!        └────────────── won-set revision ───────────────────────┘
//! ```
//!
//! The ledger is the only place winners are recorded; the pool derives the
//! available subset from it and the planner sizes each round from it.

pub mod config;
pub mod ledger;
pub mod planner;
pub mod pool;
pub mod sampler;
pub mod timing;

pub use config::*;
pub use ledger::*;
pub use planner::*;
pub use pool::*;
pub use sampler::*;
pub use timing::*;
