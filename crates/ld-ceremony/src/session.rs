//! Ceremony — the session object behind one live drawing
//!
//! Owns the lifecycle state and the active award index, and funnels every
//! winner mutation through the [`AwardLedger`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use ld_core::{
    Award, AwardId, AwardSpec, AwardUpdate, CeremonyState, LdError, LdResult, Participant,
    ParticipantId, RosterEntry,
};
use ld_draw::{AwardLedger, AwardStanding, CeremonyConfig, DrawSampler, ParticipantPool, slots_for_round};

/// Why a requested round did not start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The active award already has all its winners
    AwardComplete,
    /// Nobody is left to draw
    PoolExhausted,
}

/// One rolling preview frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewFrame {
    /// 1-based tick within the round
    pub tick: u64,
    pub participants: Vec<Participant>,
}

impl PreviewFrame {
    pub fn ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }
}

/// Result of asking for a new round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundStart {
    /// Preview is rolling; `frame` is what the audience sees first
    Drawing {
        award_id: AwardId,
        slots: u32,
        frame: PreviewFrame,
    },
    /// Nothing to draw, still in `Ready`
    Skipped { award_id: AwardId, reason: SkipReason },
}

/// Winners committed by one round, as shown on the result screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub award_id: AwardId,
    pub award_name: String,
    pub winners: Vec<Participant>,
}

/// Result of stopping the preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundOutcome {
    /// Winners recorded, ceremony in `Result`
    Committed(RoundResult),
    /// Nothing usable in the snapshot, ceremony back in `Ready`
    Empty { award_id: AwardId },
}

/// Read-only view for status displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeremonySnapshot {
    pub title: String,
    pub state: CeremonyState,
    pub active_award_index: usize,
    pub active_award: Option<AwardStanding>,
    pub slots_this_round: u32,
    pub roster_size: usize,
    pub available: usize,
    pub total_winners: usize,
    pub standings: Vec<AwardStanding>,
}

#[derive(Debug)]
struct ActiveRound {
    award_id: AwardId,
    slots: u32,
    frame: PreviewFrame,
}

/// A single ceremony session
pub struct Ceremony {
    title: String,
    pool: ParticipantPool,
    ledger: AwardLedger,
    sampler: DrawSampler,
    state: CeremonyState,
    active_award: usize,
    round: Option<ActiveRound>,
    last_result: Option<RoundResult>,
}

impl Ceremony {
    pub fn new(pool: ParticipantPool, ledger: AwardLedger, sampler: DrawSampler) -> Self {
        Self {
            title: String::new(),
            pool,
            ledger,
            sampler,
            state: CeremonyState::Setup,
            active_award: 0,
            round: None,
            last_result: None,
        }
    }

    pub fn from_config(config: &CeremonyConfig) -> LdResult<Self> {
        let (pool, ledger) = config.build()?;
        let mut ceremony = Self::new(pool, ledger, DrawSampler::new(config.seed));
        ceremony.title = config.title.clone();
        Ok(ceremony)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> CeremonyState {
        self.state
    }

    pub fn pool(&self) -> &ParticipantPool {
        &self.pool
    }

    pub fn ledger(&self) -> &AwardLedger {
        &self.ledger
    }

    pub fn awards(&self) -> &[Award] {
        self.ledger.awards()
    }

    pub fn active_award_index(&self) -> usize {
        self.active_award
    }

    pub fn active_award(&self) -> Option<&Award> {
        self.ledger.award_at(self.active_award)
    }

    /// Participants who have not won anything yet, in roster order
    pub fn available(&self) -> Arc<[Participant]> {
        self.pool.available(&self.ledger)
    }

    /// "This round will draw N people"
    pub fn slots_for_active_round(&self) -> u32 {
        self.active_award().map(slots_for_round).unwrap_or(0)
    }

    /// Frame currently shown while drawing
    pub fn current_preview(&self) -> Option<&PreviewFrame> {
        self.round.as_ref().map(|r| &r.frame)
    }

    /// Display set of the most recent committed round
    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    pub fn standings(&self) -> Vec<AwardStanding> {
        self.ledger.standings()
    }

    pub fn snapshot(&self) -> CeremonySnapshot {
        let standings = self.standings();
        CeremonySnapshot {
            title: self.title.clone(),
            state: self.state,
            active_award_index: self.active_award,
            active_award: standings.get(self.active_award).cloned(),
            slots_this_round: self.slots_for_active_round(),
            roster_size: self.pool.len(),
            available: self.available().len(),
            total_winners: self.ledger.won_count(),
            standings,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SETUP
    // ═══════════════════════════════════════════════════════════════════════

    /// Append already-parsed roster records
    pub fn add_participants(&mut self, entries: &[RosterEntry]) -> LdResult<usize> {
        self.require_configurable("edit the roster")?;
        self.pool.ingest(entries)
    }

    pub fn add_award(&mut self, spec: AwardSpec) -> LdResult<AwardId> {
        self.require_configurable("add an award")?;
        self.ledger.push_award(spec)
    }

    pub fn update_award(&mut self, id: &AwardId, update: &AwardUpdate) -> LdResult<()> {
        self.require_configurable("edit an award")?;
        self.ledger.update_award(id, update)
    }

    pub fn remove_award(&mut self, id: &AwardId) -> LdResult<Award> {
        self.require_configurable("remove an award")?;
        let removed = self.ledger.remove_award(id)?;
        if self.active_award >= self.ledger.len() {
            self.active_award = self.ledger.len().saturating_sub(1);
        }
        Ok(removed)
    }

    pub fn add_prize_image(&mut self, id: &AwardId, image: impl Into<String>) -> LdResult<()> {
        self.require_configurable("edit prize images")?;
        self.ledger.add_prize_image(id, image)
    }

    pub fn remove_prize_image(&mut self, id: &AwardId, index: usize) -> LdResult<Option<String>> {
        self.require_configurable("edit prize images")?;
        self.ledger.remove_prize_image(id, index)
    }

    /// Restart the sampler from a fixed seed
    pub fn reseed(&mut self, seed: u64) {
        self.sampler.reseed(seed);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TRANSITIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Setup → Ready
    pub fn enter_ceremony(&mut self) -> LdResult<()> {
        self.require(CeremonyState::Setup, "enter the ceremony")?;
        if self.pool.is_empty() {
            log::warn!("[Ceremony] refusing to start with an empty roster");
            return Err(LdError::EmptyRoster);
        }
        if self.ledger.is_empty() {
            log::warn!("[Ceremony] refusing to start without awards");
            return Err(LdError::NoAwards);
        }
        self.active_award = self.active_award.min(self.ledger.len() - 1);
        self.state = CeremonyState::Ready;
        log::info!(
            "[Ceremony] entered with {} participants and {} awards",
            self.pool.len(),
            self.ledger.len()
        );
        Ok(())
    }

    /// Ready → Setup
    pub fn exit_ceremony(&mut self) -> LdResult<()> {
        self.require(CeremonyState::Ready, "exit the ceremony")?;
        self.state = CeremonyState::Setup;
        log::info!("[Ceremony] back to setup");
        Ok(())
    }

    /// Ready → Drawing, unless there is nothing to draw
    pub fn start_round(&mut self) -> LdResult<RoundStart> {
        self.require(CeremonyState::Ready, "start a round")?;
        let award = self.active_award().ok_or(LdError::NoAwards)?;
        let award_id = award.id.clone();

        let slots = slots_for_round(award);
        if slots == 0 {
            log::debug!("[Ceremony] {} already fully drawn", award_id);
            return Ok(RoundStart::Skipped {
                award_id,
                reason: SkipReason::AwardComplete,
            });
        }
        if self.available().is_empty() {
            log::info!("[Ceremony] no one left to draw for {}", award_id);
            return Ok(RoundStart::Skipped {
                award_id,
                reason: SkipReason::PoolExhausted,
            });
        }

        self.round = Some(ActiveRound {
            award_id: award_id.clone(),
            slots,
            frame: PreviewFrame {
                tick: 0,
                participants: Vec::new(),
            },
        });
        self.state = CeremonyState::Drawing;
        log::info!("[Ceremony] drawing {} for {}", slots, award_id);

        let frame = self.preview_tick().cloned().unwrap_or(PreviewFrame {
            tick: 0,
            participants: Vec::new(),
        });
        Ok(RoundStart::Drawing {
            award_id,
            slots,
            frame,
        })
    }

    /// Draw a fresh preview frame; `None` unless drawing
    ///
    /// Each frame is an independent sample of the pool as it is right now.
    pub fn preview_tick(&mut self) -> Option<&PreviewFrame> {
        if self.state != CeremonyState::Drawing {
            return None;
        }
        let available = self.pool.available(&self.ledger);
        let round = self.round.as_mut()?;
        round.frame = PreviewFrame {
            tick: round.frame.tick + 1,
            participants: self.sampler.sample(&available, round.slots as usize),
        };
        Some(&round.frame)
    }

    /// Drawing → Result, committing exactly the given preview snapshot
    ///
    /// The snapshot is matched by id against the current available pool,
    /// de-duplicated and cut to the round's slots. Nothing is re-sampled.
    /// An empty result returns the ceremony to `Ready`.
    pub fn stop_round(&mut self, snapshot: &[ParticipantId]) -> LdResult<RoundOutcome> {
        self.require(CeremonyState::Drawing, "stop a round")?;
        let round = self
            .round
            .take()
            .ok_or_else(|| LdError::transition(self.state, "stop a round"))?;

        let available = self.pool.available(&self.ledger);
        let by_id: HashMap<&ParticipantId, &Participant> =
            available.iter().map(|p| (&p.id, p)).collect();
        let mut seen = HashSet::new();
        let picks: Vec<Participant> = snapshot
            .iter()
            .filter(|id| seen.insert(*id))
            .filter_map(|id| by_id.get(id).map(|p| (*p).clone()))
            .take(round.slots as usize)
            .collect();

        let winners = self.ledger.add_winners(&round.award_id, &picks);
        if winners.is_empty() {
            self.state = CeremonyState::Ready;
            log::info!("[Ceremony] round for {} stopped empty", round.award_id);
            return Ok(RoundOutcome::Empty {
                award_id: round.award_id,
            });
        }

        let award_name = self
            .ledger
            .award(&round.award_id)
            .map(|a| a.name.clone())
            .unwrap_or_default();
        let result = RoundResult {
            award_id: round.award_id,
            award_name,
            winners,
        };
        log::info!(
            "[Ceremony] {} winner(s) for {}",
            result.winners.len(),
            result.award_id
        );
        self.last_result = Some(result.clone());
        self.state = CeremonyState::Result;
        Ok(RoundOutcome::Committed(result))
    }

    /// Stop and commit whatever frame is on screen
    pub fn stop_round_at_preview(&mut self) -> LdResult<RoundOutcome> {
        let shown = self.current_preview().map(PreviewFrame::ids).unwrap_or_default();
        self.stop_round(&shown)
    }

    /// Result → Ready
    pub fn confirm_result(&mut self) -> LdResult<()> {
        self.require(CeremonyState::Result, "confirm a result")?;
        self.state = CeremonyState::Ready;
        Ok(())
    }

    /// Select the next award, wrapping
    pub fn next_award(&mut self) -> LdResult<usize> {
        self.step_award(1)
    }

    /// Select the previous award, wrapping
    pub fn prev_award(&mut self) -> LdResult<usize> {
        self.step_award(-1)
    }

    fn step_award(&mut self, delta: isize) -> LdResult<usize> {
        self.require(CeremonyState::Ready, "switch awards")?;
        let count = self.ledger.len();
        if count == 0 {
            return Err(LdError::NoAwards);
        }
        self.active_award = (self.active_award as isize + delta).rem_euclid(count as isize) as usize;
        Ok(self.active_award)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // LEDGER CORRECTIONS (between rounds)
    // ═══════════════════════════════════════════════════════════════════════

    /// Return one winner to the pool; `None` if they had not won
    pub fn remove_winner(&mut self, id: &ParticipantId) -> LdResult<Option<AwardId>> {
        self.forbid_while_drawing("remove a winner")?;
        Ok(self.ledger.remove_winner(id))
    }

    pub fn clear_award(&mut self, id: &AwardId) -> LdResult<Vec<ParticipantId>> {
        self.forbid_while_drawing("clear an award")?;
        Ok(self.ledger.clear_award(id))
    }

    pub fn clear_all(&mut self) -> LdResult<usize> {
        self.forbid_while_drawing("clear all winners")?;
        Ok(self.ledger.clear_all())
    }

    fn forbid_while_drawing(&self, action: &'static str) -> LdResult<()> {
        if self.state == CeremonyState::Drawing {
            log::warn!("[Ceremony] cannot {} while drawing", action);
            return Err(LdError::transition(self.state, action));
        }
        Ok(())
    }

    fn require(&self, expected: CeremonyState, action: &'static str) -> LdResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            log::warn!("[Ceremony] cannot {} in {}", action, self.state);
            Err(LdError::transition(self.state, action))
        }
    }

    fn require_configurable(&self, action: &'static str) -> LdResult<()> {
        if self.state.allows_configuration() {
            return Ok(());
        }
        log::warn!("[Ceremony] cannot {} outside setup ({})", action, self.state);
        Err(LdError::transition(self.state, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ceremony(names: &[&str], awards: Vec<AwardSpec>) -> Ceremony {
        let entries: Vec<RosterEntry> = names.iter().map(|n| RosterEntry::named(*n)).collect();
        let pool = ParticipantPool::from_entries(&entries).unwrap();
        let ledger = AwardLedger::from_specs(awards).unwrap();
        Ceremony::new(pool, ledger, DrawSampler::seeded(11))
    }

    #[test]
    fn test_enter_requires_roster() {
        let mut c = ceremony(&[], vec![AwardSpec::new("Prize", 1)]);
        assert!(matches!(c.enter_ceremony(), Err(LdError::EmptyRoster)));
        assert_eq!(c.state(), CeremonyState::Setup);

        let mut c = ceremony(&["A"], vec![]);
        assert!(matches!(c.enter_ceremony(), Err(LdError::NoAwards)));
        assert_eq!(c.state(), CeremonyState::Setup);
    }

    #[test]
    fn test_full_round_cycle() {
        let mut c = ceremony(&["A", "B", "C"], vec![AwardSpec::new("Prize", 2)]);
        c.enter_ceremony().unwrap();

        let start = c.start_round().unwrap();
        let RoundStart::Drawing { slots, frame, .. } = start else {
            panic!("expected drawing, got {start:?}");
        };
        assert_eq!(slots, 2);
        assert_eq!(frame.tick, 1);
        assert_eq!(c.state(), CeremonyState::Drawing);

        let shown = c.preview_tick().unwrap().clone();
        assert_eq!(shown.tick, 2);

        let RoundOutcome::Committed(result) = c.stop_round_at_preview().unwrap() else {
            panic!("expected winners");
        };
        assert_eq!(result.winners, shown.participants);
        assert_eq!(c.state(), CeremonyState::Result);
        assert_eq!(c.available().len(), 1);

        c.confirm_result().unwrap();
        assert_eq!(c.state(), CeremonyState::Ready);
        assert!(matches!(
            c.start_round().unwrap(),
            RoundStart::Skipped { reason: SkipReason::AwardComplete, .. }
        ));
        assert_eq!(c.state(), CeremonyState::Ready);
    }

    #[test]
    fn test_exhausted_pool_skips_without_drawing() {
        let mut c = ceremony(&["A"], vec![AwardSpec::new("One", 1), AwardSpec::new("Two", 1)]);
        c.enter_ceremony().unwrap();
        c.start_round().unwrap();
        c.stop_round_at_preview().unwrap();
        c.confirm_result().unwrap();

        c.next_award().unwrap();
        assert!(matches!(
            c.start_round().unwrap(),
            RoundStart::Skipped { reason: SkipReason::PoolExhausted, .. }
        ));
        assert_eq!(c.state(), CeremonyState::Ready);
    }

    #[test]
    fn test_stop_with_unusable_snapshot_returns_to_ready() {
        let mut c = ceremony(&["A", "B"], vec![AwardSpec::new("Prize", 1)]);
        c.enter_ceremony().unwrap();
        c.start_round().unwrap();

        let outcome = c.stop_round(&[ParticipantId::from("ghost")]).unwrap();
        assert!(matches!(outcome, RoundOutcome::Empty { .. }));
        assert_eq!(c.state(), CeremonyState::Ready);
        assert_eq!(c.ledger().won_count(), 0);
    }

    #[test]
    fn test_stop_truncates_and_dedupes_snapshot() {
        let mut c = ceremony(&["A", "B", "C", "D"], vec![AwardSpec::new("Prize", 4).with_batch_size(2)]);
        c.enter_ceremony().unwrap();
        c.start_round().unwrap();

        let ids: Vec<ParticipantId> = c.pool().roster().iter().map(|p| p.id.clone()).collect();
        let snapshot = vec![ids[2].clone(), ids[2].clone(), ids[0].clone(), ids[3].clone()];
        let RoundOutcome::Committed(result) = c.stop_round(&snapshot).unwrap() else {
            panic!("expected winners");
        };
        let won: Vec<_> = result.winners.iter().map(|p| p.id.clone()).collect();
        assert_eq!(won, vec![ids[2].clone(), ids[0].clone()]);
    }

    #[test]
    fn test_illegal_transitions_leave_state_alone() {
        let mut c = ceremony(&["A"], vec![AwardSpec::new("Prize", 1)]);
        assert!(c.start_round().is_err());
        assert!(c.exit_ceremony().is_err());
        assert!(c.next_award().is_err());

        c.enter_ceremony().unwrap();
        assert!(c.enter_ceremony().is_err());
        assert!(c.confirm_result().is_err());
        assert!(c.add_award(AwardSpec::new("Late", 1)).is_err());

        c.start_round().unwrap();
        assert!(matches!(
            c.exit_ceremony(),
            Err(LdError::InvalidTransition { state: CeremonyState::Drawing, .. })
        ));
        assert!(c.next_award().is_err());
        assert_eq!(c.state(), CeremonyState::Drawing);
    }

    #[test]
    fn test_award_navigation_wraps() {
        let mut c = ceremony(
            &["A"],
            vec![AwardSpec::new("1", 1), AwardSpec::new("2", 1), AwardSpec::new("3", 1)],
        );
        c.enter_ceremony().unwrap();
        assert_eq!(c.prev_award().unwrap(), 2);
        assert_eq!(c.next_award().unwrap(), 0);
        assert_eq!(c.next_award().unwrap(), 1);
    }

    #[test]
    fn test_remove_award_clamps_active_index() {
        let mut c = ceremony(&["A"], vec![AwardSpec::new("1", 1), AwardSpec::new("2", 1)]);
        c.enter_ceremony().unwrap();
        c.next_award().unwrap();
        c.exit_ceremony().unwrap();

        let last = c.awards()[1].id.clone();
        c.remove_award(&last).unwrap();
        assert_eq!(c.active_award_index(), 0);
    }

    #[test]
    fn test_snapshot_reports_progress() {
        let mut c = ceremony(&["A", "B", "C"], vec![AwardSpec::new("Prize", 3).with_batch_size(1)]);
        c.enter_ceremony().unwrap();
        c.start_round().unwrap();
        c.stop_round_at_preview().unwrap();

        let snap = c.snapshot();
        assert_eq!(snap.state, CeremonyState::Result);
        assert_eq!(snap.total_winners, 1);
        assert_eq!(snap.available, 2);
        assert_eq!(snap.roster_size, 3);
        assert_eq!(snap.active_award.as_ref().map(|a| a.won), Some(1));
    }

    #[test]
    fn test_corrections_wait_for_round_to_end() {
        let mut c = ceremony(&["A", "B"], vec![AwardSpec::new("Prize", 2).with_batch_size(1)]);
        c.enter_ceremony().unwrap();
        c.start_round().unwrap();
        assert!(c.clear_all().is_err());

        let RoundOutcome::Committed(result) = c.stop_round_at_preview().unwrap() else {
            panic!("expected winners");
        };
        let winner = result.winners[0].id.clone();
        assert_eq!(c.remove_winner(&winner).unwrap(), Some(result.award_id.clone()));
        assert_eq!(c.available().len(), 2);
        assert_eq!(c.remove_winner(&winner).unwrap(), None);
    }

    fn assert_setup_edits_rejected(c: &mut Ceremony) {
        let state = c.state();
        let award = c.awards()[0].id.clone();
        let awards_before = c.awards().to_vec();
        let roster_before = c.pool().len();

        assert!(matches!(
            c.add_participants(&[RosterEntry::named("Late")]),
            Err(LdError::InvalidTransition { .. })
        ));
        let rename = AwardUpdate {
            name: Some("Renamed".into()),
            ..AwardUpdate::default()
        };
        assert!(matches!(c.update_award(&award, &rename), Err(LdError::InvalidTransition { .. })));
        assert!(matches!(c.remove_award(&award), Err(LdError::InvalidTransition { .. })));
        assert!(matches!(c.add_prize_image(&award, "car.png"), Err(LdError::InvalidTransition { .. })));
        assert!(matches!(c.remove_prize_image(&award, 0), Err(LdError::InvalidTransition { .. })));

        assert_eq!(c.state(), state);
        assert_eq!(c.awards(), awards_before.as_slice());
        assert_eq!(c.pool().len(), roster_before);
    }

    #[test]
    fn test_setup_edits_rejected_while_presenting() {
        let mut c = ceremony(&["A", "B", "C"], vec![AwardSpec::new("Prize", 1)]);
        let award = c.awards()[0].id.clone();
        c.add_prize_image(&award, "tv.png").unwrap();
        c.enter_ceremony().unwrap();
        assert_setup_edits_rejected(&mut c);

        c.start_round().unwrap();
        c.stop_round_at_preview().unwrap();
        assert_eq!(c.state(), CeremonyState::Result);
        assert_setup_edits_rejected(&mut c);
        assert_eq!(c.awards()[0].prize_images, vec!["tv.png".to_string()]);
    }

    #[test]
    fn test_setup_edits_after_exit_reach_the_pool() {
        let mut c = ceremony(&["A", "B"], vec![AwardSpec::new("Prize", 3)]);
        c.enter_ceremony().unwrap();
        c.exit_ceremony().unwrap();

        assert_eq!(c.add_participants(&[RosterEntry::named("C"), RosterEntry::named(" ")]).unwrap(), 1);
        let award = c.awards()[0].id.clone();
        c.add_prize_image(&award, "bike.png").unwrap();
        assert_eq!(c.remove_prize_image(&award, 0).unwrap().as_deref(), Some("bike.png"));
        c.enter_ceremony().unwrap();

        let available: Vec<String> = c.available().iter().map(|p| p.name.clone()).collect();
        assert_eq!(available, vec!["A", "B", "C"]);
        assert_eq!(c.slots_for_active_round(), 3);
    }
}
