//! Ceremony lifecycle states

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the ceremony currently is in its lifecycle
///
/// ```text
/// Setup ──enter──▶ Ready ──start──▶ Drawing ──stop──▶ Result
///   ▲                │ ▲                │                │
///   └─────exit───────┘ └──(empty stop)──┘                │
///                      ▲                                 │
///                      └─────────────confirm─────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeremonyState {
    /// Roster and awards configurable, presentation hidden
    Setup,
    /// Presentation visible, operator may start a round
    Ready,
    /// Rolling preview running
    Drawing,
    /// Last round's winners displayed until acknowledged
    Result,
}

impl CeremonyState {
    /// Can roster and award configuration be edited
    pub fn allows_configuration(self) -> bool {
        matches!(self, Self::Setup)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Setup => "Setup",
            Self::Ready => "Ready",
            Self::Drawing => "Drawing",
            Self::Result => "Result",
        }
    }
}

impl Default for CeremonyState {
    fn default() -> Self {
        Self::Setup
    }
}

impl fmt::Display for CeremonyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
