//! CeremonyEvent — what the presentation layer reacts to
//!
//! Every state change, preview frame and effect pulse leaves the driver as a
//! [`CeremonyEvent`]. A [`CeremonyTrace`] keeps the meaningful ones as an
//! after-the-fact record of the ceremony.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ld_core::{AwardId, CeremonyState, LdError, LdResult, Participant, ParticipantId};

use crate::session::SkipReason;

/// Background music / video control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCue {
    Resume,
    Pause,
}

/// Ceremony stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    // ═══ LIFECYCLE ═══
    CeremonyEntered {
        award_index: usize,
    },
    CeremonyExited,
    AwardSelected {
        award_id: AwardId,
        index: usize,
    },

    // ═══ ROUNDS ═══
    RoundStarted {
        award_id: AwardId,
        slots: u32,
    },
    RoundSkipped {
        award_id: AwardId,
        reason: SkipReason,
    },
    /// Rolling names on screen
    PreviewTick {
        tick: u64,
        participants: Vec<Participant>,
    },
    RoundCommitted {
        award_id: AwardId,
        award_name: String,
        winners: Vec<Participant>,
    },
    RoundEmpty {
        award_id: AwardId,
    },
    ResultConfirmed,

    // ═══ CORRECTIONS ═══
    WinnerRemoved {
        participant_id: ParticipantId,
        award_id: AwardId,
    },
    AwardCleared {
        award_id: AwardId,
        released: usize,
    },
    LedgerCleared {
        released: usize,
    },

    // ═══ PRESENTATION ═══
    Media {
        cue: MediaCue,
    },
    /// Decorative effect pulse at the state's cadence
    Ambient {
        state: CeremonyState,
    },
}

impl Stage {
    /// Get stage type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::CeremonyEntered { .. } => "ceremony_entered",
            Self::CeremonyExited => "ceremony_exited",
            Self::AwardSelected { .. } => "award_selected",
            Self::RoundStarted { .. } => "round_started",
            Self::RoundSkipped { .. } => "round_skipped",
            Self::PreviewTick { .. } => "preview_tick",
            Self::RoundCommitted { .. } => "round_committed",
            Self::RoundEmpty { .. } => "round_empty",
            Self::ResultConfirmed => "result_confirmed",
            Self::WinnerRemoved { .. } => "winner_removed",
            Self::AwardCleared { .. } => "award_cleared",
            Self::LedgerCleared { .. } => "ledger_cleared",
            Self::Media { .. } => "media",
            Self::Ambient { .. } => "ambient",
        }
    }

    /// High-frequency presentation stages that carry no ceremony record
    pub fn is_cosmetic(&self) -> bool {
        matches!(self, Self::PreviewTick { .. } | Self::Ambient { .. } | Self::Media { .. })
    }
}

/// A stage with ordering and wall-clock time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeremonyEvent {
    /// Monotonic per driver, starting at 1
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub stage: Stage,
}

impl CeremonyEvent {
    pub fn new(sequence: u64, stage: Stage) -> Self {
        Self {
            sequence,
            timestamp: Utc::now(),
            stage,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.stage.type_name()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TRACE
// ═══════════════════════════════════════════════════════════════════════════

/// Recorded ceremony, cosmetic stages left out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeremonyTrace {
    pub title: String,
    pub started_at: DateTime<Utc>,
    pub events: Vec<CeremonyEvent>,
}

impl CeremonyTrace {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            started_at: Utc::now(),
            events: Vec::new(),
        }
    }

    /// Keep the event unless it is cosmetic; returns whether it was kept
    pub fn record(&mut self, event: &CeremonyEvent) -> bool {
        if event.stage.is_cosmetic() {
            return false;
        }
        self.events.push(event.clone());
        true
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events_by_type(&self, type_name: &str) -> Vec<&CeremonyEvent> {
        self.events.iter().filter(|e| e.type_name() == type_name).collect()
    }

    /// Number of participants committed across all rounds, before corrections
    pub fn committed_count(&self) -> usize {
        self.events
            .iter()
            .map(|e| match &e.stage {
                Stage::RoundCommitted { winners, .. } => winners.len(),
                _ => 0,
            })
            .sum()
    }

    pub fn to_json(&self) -> LdResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| LdError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_serializes_tagged() {
        let stage = Stage::RoundStarted {
            award_id: AwardId::new("3"),
            slots: 3,
        };
        let json = serde_json::to_value(&stage).unwrap();
        assert_eq!(json["type"], "round_started");
        assert_eq!(json["award_id"], "3");
        assert_eq!(json["slots"], 3);

        let media = serde_json::to_value(Stage::Media { cue: MediaCue::Pause }).unwrap();
        assert_eq!(media["cue"], "pause");
    }

    #[test]
    fn test_type_name_matches_serde_tag() {
        let stages = [
            Stage::CeremonyExited,
            Stage::ResultConfirmed,
            Stage::LedgerCleared { released: 2 },
            Stage::Ambient {
                state: CeremonyState::Result,
            },
        ];
        for stage in stages {
            let json = serde_json::to_value(&stage).unwrap();
            assert_eq!(json["type"], stage.type_name());
        }
    }

    #[test]
    fn test_trace_skips_cosmetic_stages() {
        let mut trace = CeremonyTrace::new("Annual party");
        assert!(!trace.record(&CeremonyEvent::new(
            1,
            Stage::PreviewTick {
                tick: 1,
                participants: vec![],
            }
        )));
        assert!(trace.record(&CeremonyEvent::new(
            2,
            Stage::RoundCommitted {
                award_id: AwardId::new("1"),
                award_name: "First".into(),
                winners: vec![Participant::new("p-1", "Ana"), Participant::new("p-2", "Ana")],
            }
        )));
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.committed_count(), 2);
        assert_eq!(trace.events_by_type("round_committed").len(), 1);

        let json = trace.to_json().unwrap();
        let back: CeremonyTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trace);
    }
}
