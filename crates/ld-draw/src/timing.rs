//! Timing profiles for the rolling preview and ambient effect pulses

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use ld_core::CeremonyState;

/// Timing profile for a ceremony
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Stage timing for a live audience
    Normal,
    /// Faster cadence for rehearsals
    Brisk,
    /// Near-zero intervals for tests and scripted runs
    Instant,
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::Normal
    }
}

impl fmt::Display for TimingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::Brisk => "brisk",
            Self::Instant => "instant",
        })
    }
}

impl FromStr for TimingProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "brisk" => Ok(Self::Brisk),
            "instant" => Ok(Self::Instant),
            other => Err(format!("unknown timing profile '{other}' (normal, brisk, instant)")),
        }
    }
}

/// Detailed timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    pub profile: TimingProfile,

    /// Rolling preview refresh while drawing (ms)
    pub preview_interval_ms: u64,

    /// Ambient effect pulse while waiting for the operator (ms)
    pub idle_ambient_ms: u64,

    /// Ambient effect pulse while the preview rolls (ms)
    pub drawing_ambient_ms: u64,

    /// Ambient effect pulse over the result screen (ms)
    pub result_ambient_ms: u64,
}

impl TimingConfig {
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            preview_interval_ms: 60,
            idle_ambient_ms: 1200,
            drawing_ambient_ms: 450,
            result_ambient_ms: 180,
        }
    }

    pub fn brisk() -> Self {
        Self {
            profile: TimingProfile::Brisk,
            preview_interval_ms: 40,
            idle_ambient_ms: 800,
            drawing_ambient_ms: 300,
            result_ambient_ms: 120,
        }
    }

    pub fn instant() -> Self {
        Self {
            profile: TimingProfile::Instant,
            preview_interval_ms: 1,
            idle_ambient_ms: 50,
            drawing_ambient_ms: 20,
            result_ambient_ms: 10,
        }
    }

    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Brisk => Self::brisk(),
            TimingProfile::Instant => Self::instant(),
        }
    }

    pub fn preview_interval(&self) -> Duration {
        Duration::from_millis(self.preview_interval_ms.max(1))
    }

    /// Ambient pulse cadence for a state; none while in setup
    pub fn ambient_interval(&self, state: CeremonyState) -> Option<Duration> {
        let ms = match state {
            CeremonyState::Setup => return None,
            CeremonyState::Ready => self.idle_ambient_ms,
            CeremonyState::Drawing => self.drawing_ambient_ms,
            CeremonyState::Result => self.result_ambient_ms,
        };
        Some(Duration::from_millis(ms.max(1)))
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}
