//! Operator commands — console/remote → ceremony
//!
//! Each command maps onto one [`Ceremony`] operation and yields the stages
//! the driver should broadcast for it.

use serde::{Deserialize, Serialize};

use ld_core::{AwardId, LdResult, ParticipantId};

use crate::event::{MediaCue, Stage};
use crate::session::{Ceremony, CeremonySnapshot, RoundOutcome, RoundStart};

/// Commands an operator can send to a running ceremony
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CeremonyCommand {
    /// Setup → Ready
    Enter,

    /// Ready → Setup
    Exit,

    /// Begin a rolling preview for the active award
    StartRound,

    /// Stop the preview and commit
    StopRound {
        /// Exact frame to commit; `None` commits the frame currently shown
        #[serde(default, skip_serializing_if = "Option::is_none")]
        snapshot: Option<Vec<ParticipantId>>,
    },

    /// Dismiss the result screen
    ConfirmResult,

    NextAward,

    PrevAward,

    /// Return one winner to the pool
    RemoveWinner { participant_id: ParticipantId },

    /// Empty one award's winner list
    ClearAward { award_id: AwardId },

    /// Empty every award
    ClearAll,

    /// Request the current status
    Snapshot,
}

impl CeremonyCommand {
    /// Get command name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Exit => "exit",
            Self::StartRound => "start_round",
            Self::StopRound { .. } => "stop_round",
            Self::ConfirmResult => "confirm_result",
            Self::NextAward => "next_award",
            Self::PrevAward => "prev_award",
            Self::RemoveWinner { .. } => "remove_winner",
            Self::ClearAward { .. } => "clear_award",
            Self::ClearAll => "clear_all",
            Self::Snapshot => "snapshot",
        }
    }

    /// Run against a ceremony, returning the reply and the stages to emit
    ///
    /// Nothing is emitted when the ceremony rejects the command.
    pub fn apply(self, ceremony: &mut Ceremony) -> LdResult<Applied> {
        let applied = match self {
            Self::Enter => {
                ceremony.enter_ceremony()?;
                Applied::new(CommandOutcome::Done)
                    .with(Stage::CeremonyEntered {
                        award_index: ceremony.active_award_index(),
                    })
                    .with(Stage::Media { cue: MediaCue::Resume })
            }
            Self::Exit => {
                ceremony.exit_ceremony()?;
                Applied::new(CommandOutcome::Done)
                    .with(Stage::CeremonyExited)
                    .with(Stage::Media { cue: MediaCue::Pause })
            }
            Self::StartRound => {
                let start = ceremony.start_round()?;
                let stages = match &start {
                    RoundStart::Drawing {
                        award_id,
                        slots,
                        frame,
                    } => vec![
                        Stage::RoundStarted {
                            award_id: award_id.clone(),
                            slots: *slots,
                        },
                        Stage::PreviewTick {
                            tick: frame.tick,
                            participants: frame.participants.clone(),
                        },
                    ],
                    RoundStart::Skipped { award_id, reason } => vec![Stage::RoundSkipped {
                        award_id: award_id.clone(),
                        reason: *reason,
                    }],
                };
                Applied {
                    outcome: CommandOutcome::Round(start),
                    stages,
                }
            }
            Self::StopRound { snapshot } => {
                let outcome = match snapshot {
                    Some(ids) => ceremony.stop_round(&ids)?,
                    None => ceremony.stop_round_at_preview()?,
                };
                let stage = match &outcome {
                    RoundOutcome::Committed(result) => Stage::RoundCommitted {
                        award_id: result.award_id.clone(),
                        award_name: result.award_name.clone(),
                        winners: result.winners.clone(),
                    },
                    RoundOutcome::Empty { award_id } => Stage::RoundEmpty {
                        award_id: award_id.clone(),
                    },
                };
                Applied::new(CommandOutcome::Stopped(outcome)).with(stage)
            }
            Self::ConfirmResult => {
                ceremony.confirm_result()?;
                Applied::new(CommandOutcome::Done).with(Stage::ResultConfirmed)
            }
            Self::NextAward => {
                let index = ceremony.next_award()?;
                Self::selected(ceremony, index)
            }
            Self::PrevAward => {
                let index = ceremony.prev_award()?;
                Self::selected(ceremony, index)
            }
            Self::RemoveWinner { participant_id } => {
                let owner = ceremony.remove_winner(&participant_id)?;
                let mut applied = Applied::new(CommandOutcome::Removed(owner.clone()));
                if let Some(award_id) = owner {
                    applied = applied.with(Stage::WinnerRemoved {
                        participant_id,
                        award_id,
                    });
                }
                applied
            }
            Self::ClearAward { award_id } => {
                let released = ceremony.clear_award(&award_id)?.len();
                Applied::new(CommandOutcome::Released(released))
                    .with(Stage::AwardCleared { award_id, released })
            }
            Self::ClearAll => {
                let released = ceremony.clear_all()?;
                Applied::new(CommandOutcome::Released(released)).with(Stage::LedgerCleared { released })
            }
            Self::Snapshot => Applied::new(CommandOutcome::Snapshot(Box::new(ceremony.snapshot()))),
        };
        Ok(applied)
    }

    fn selected(ceremony: &Ceremony, index: usize) -> Applied {
        let applied = Applied::new(CommandOutcome::AwardIndex(index));
        match ceremony.active_award() {
            Some(award) => applied.with(Stage::AwardSelected {
                award_id: award.id.clone(),
                index,
            }),
            None => applied,
        }
    }
}

/// Reply to a successfully applied command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum CommandOutcome {
    Done,
    Round(RoundStart),
    Stopped(RoundOutcome),
    AwardIndex(usize),
    /// Award the removed participant belonged to
    Removed(Option<AwardId>),
    /// Number of winners returned to the pool
    Released(usize),
    Snapshot(Box<CeremonySnapshot>),
}

/// A command's reply plus the stages it produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub outcome: CommandOutcome,
    pub stages: Vec<Stage>,
}

impl Applied {
    fn new(outcome: CommandOutcome) -> Self {
        Self {
            outcome,
            stages: Vec::new(),
        }
    }

    fn with(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }
}
