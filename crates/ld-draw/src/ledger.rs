//! Award ledger — the single record of who has won what
//!
//! Every winner mutation goes through this type so the global won-set and
//! the per-award winner lists can never disagree.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use ld_core::{Award, AwardId, AwardSpec, AwardUpdate, LdError, LdResult, Participant, ParticipantId};

use crate::planner::slots_for_round;
use crate::pool::WonSet;

static NEXT_LEDGER_TAG: AtomicU64 = AtomicU64::new(1);

/// Ordered awards plus the global won-set
#[derive(Debug)]
pub struct AwardLedger {
    awards: Vec<Award>,
    /// Global won-set: participant id -> the one award listing them
    owners: HashMap<ParticipantId, AwardId>,
    /// Bumped on every mutation
    revision: u64,
    /// Distinguishes ledgers for caches keyed on revision
    tag: u64,
    next_award_seq: u64,
}

/// One line of the winner board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardStanding {
    pub id: AwardId,
    pub name: String,
    pub won: u32,
    pub target: u32,
    /// Slots the next round of this award would draw
    pub next_round: u32,
}

impl AwardLedger {
    pub fn new() -> Self {
        Self {
            awards: Vec::new(),
            owners: HashMap::new(),
            revision: 0,
            tag: NEXT_LEDGER_TAG.fetch_add(1, Ordering::Relaxed),
            next_award_seq: 1,
        }
    }

    /// Build a ledger from award configuration, in order
    pub fn from_specs(specs: impl IntoIterator<Item = AwardSpec>) -> LdResult<Self> {
        let mut ledger = Self::new();
        for spec in specs {
            ledger.push_award(spec)?;
        }
        Ok(ledger)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════

    pub fn awards(&self) -> &[Award] {
        &self.awards
    }

    pub fn len(&self) -> usize {
        self.awards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.awards.is_empty()
    }

    pub fn award(&self, id: &AwardId) -> Option<&Award> {
        self.awards.iter().find(|a| &a.id == id)
    }

    pub fn award_at(&self, index: usize) -> Option<&Award> {
        self.awards.get(index)
    }

    pub fn position(&self, id: &AwardId) -> Option<usize> {
        self.awards.iter().position(|a| &a.id == id)
    }

    /// Award currently listing this participant
    pub fn owner_of(&self, id: &ParticipantId) -> Option<&AwardId> {
        self.owners.get(id)
    }

    pub fn is_won(&self, id: &ParticipantId) -> bool {
        self.owners.contains_key(id)
    }

    /// Size of the global won-set
    pub fn won_count(&self) -> usize {
        self.owners.len()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn tag(&self) -> u64 {
        self.tag
    }

    pub fn standings(&self) -> Vec<AwardStanding> {
        self.awards
            .iter()
            .map(|a| AwardStanding {
                id: a.id.clone(),
                name: a.name.clone(),
                won: a.winners.len() as u32,
                target: a.target_count,
                next_round: slots_for_round(a),
            })
            .collect()
    }

    /// Check the won-set against the winner lists
    ///
    /// Holds after every public operation; tests assert it.
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        let mut total = 0;
        for award in &self.awards {
            if award.winners.len() > award.target_count as usize {
                return false;
            }
            for winner in &award.winners {
                total += 1;
                if !seen.insert(&winner.id) {
                    return false;
                }
                if self.owners.get(&winner.id) != Some(&award.id) {
                    return false;
                }
            }
        }
        total == self.owners.len()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // WINNER OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Record `new_winners` against an award
    ///
    /// Skips anyone already listed on this award, anyone owned by another
    /// award, and anything past the award's remaining capacity. Returns what
    /// was actually committed; unknown awards commit nothing.
    pub fn add_winners(&mut self, award_id: &AwardId, new_winners: &[Participant]) -> Vec<Participant> {
        let Some(index) = self.position(award_id) else {
            log::warn!("[Ledger] add_winners on unknown award {}", award_id);
            return Vec::new();
        };

        let award = &mut self.awards[index];
        let mut committed = Vec::new();
        for winner in new_winners {
            if award.is_complete() {
                log::debug!("[Ledger] {} is full, dropping {}", award.id, winner.id);
                break;
            }
            match self.owners.get(&winner.id) {
                Some(owner) if owner == &award.id => continue,
                Some(owner) => {
                    log::warn!(
                        "[Ledger] {} already won {}, not adding to {}",
                        winner.id,
                        owner,
                        award.id
                    );
                    continue;
                }
                None => {}
            }
            award.winners.push(winner.clone());
            self.owners.insert(winner.id.clone(), award.id.clone());
            committed.push(winner.clone());
        }

        if !committed.is_empty() {
            self.revision += 1;
            log::debug!(
                "[Ledger] committed {} winner(s) to {} ({}/{})",
                committed.len(),
                award.id,
                award.winners.len(),
                award.target_count
            );
        }
        committed
    }

    /// Return a winner to the available pool
    pub fn remove_winner(&mut self, participant_id: &ParticipantId) -> Option<AwardId> {
        let owner = self.owners.remove(participant_id)?;
        if let Some(award) = self.awards.iter_mut().find(|a| a.id == owner) {
            award.winners.retain(|w| &w.id != participant_id);
        }
        self.revision += 1;
        log::info!("[Ledger] removed {} from {}", participant_id, owner);
        Some(owner)
    }

    /// Empty one award, releasing exactly its winners
    pub fn clear_award(&mut self, award_id: &AwardId) -> Vec<ParticipantId> {
        let Some(award) = self.awards.iter_mut().find(|a| &a.id == award_id) else {
            return Vec::new();
        };
        let released: Vec<ParticipantId> = award.winners.drain(..).map(|w| w.id).collect();
        for id in &released {
            self.owners.remove(id);
        }
        if !released.is_empty() {
            self.revision += 1;
            log::info!("[Ledger] cleared {} winner(s) from {}", released.len(), award_id);
        }
        released
    }

    /// Empty every award and the won-set
    pub fn clear_all(&mut self) -> usize {
        let released = self.owners.len();
        for award in &mut self.awards {
            award.winners.clear();
        }
        self.owners.clear();
        if released > 0 {
            self.revision += 1;
            log::info!("[Ledger] cleared all {} winner(s)", released);
        }
        released
    }

    // ═══════════════════════════════════════════════════════════════════════
    // AWARD CONFIGURATION (setup only, gated by the ceremony)
    // ═══════════════════════════════════════════════════════════════════════

    /// Append an award; generates an id when none is given
    pub fn push_award(&mut self, spec: AwardSpec) -> LdResult<AwardId> {
        let id = match spec.id.as_deref() {
            Some(explicit) => {
                let id = AwardId::new(explicit);
                if self.position(&id).is_some() {
                    return Err(LdError::DuplicateAward(id));
                }
                id
            }
            None => self.generate_award_id(),
        };
        self.awards.push(spec.into_award(id.clone()));
        self.revision += 1;
        Ok(id)
    }

    pub fn update_award(&mut self, id: &AwardId, update: &AwardUpdate) -> LdResult<()> {
        let award = self
            .awards
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| LdError::UnknownAward(id.clone()))?;
        if update.is_empty() {
            return Ok(());
        }

        if let Some(target) = update.target_count {
            if (target as usize) < award.winners.len() {
                return Err(LdError::TargetBelowWinners {
                    award: id.clone(),
                    winners: award.winners.len(),
                    target,
                });
            }
        }

        if let Some(name) = &update.name {
            award.name = name.clone();
        }
        if let Some(target) = update.target_count {
            award.target_count = target;
        }
        if let Some(batch) = update.batch_size {
            award.batch_size = batch.filter(|&b| b > 0);
        }
        self.revision += 1;
        Ok(())
    }

    /// Delete an award, returning its winners to the pool
    pub fn remove_award(&mut self, id: &AwardId) -> LdResult<Award> {
        let index = self
            .position(id)
            .ok_or_else(|| LdError::UnknownAward(id.clone()))?;
        let award = self.awards.remove(index);
        for winner in &award.winners {
            self.owners.remove(&winner.id);
        }
        self.revision += 1;
        Ok(award)
    }

    pub fn add_prize_image(&mut self, id: &AwardId, image: impl Into<String>) -> LdResult<()> {
        let award = self
            .awards
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| LdError::UnknownAward(id.clone()))?;
        award.prize_images.push(image.into());
        Ok(())
    }

    /// Remove the image at `index`; out of range is a no-op
    pub fn remove_prize_image(&mut self, id: &AwardId, index: usize) -> LdResult<Option<String>> {
        let award = self
            .awards
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| LdError::UnknownAward(id.clone()))?;
        Ok((index < award.prize_images.len()).then(|| award.prize_images.remove(index)))
    }

    fn generate_award_id(&mut self) -> AwardId {
        loop {
            let id = AwardId::generated(self.next_award_seq);
            self.next_award_seq += 1;
            if self.position(&id).is_none() {
                return id;
            }
        }
    }
}

impl Default for AwardLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl WonSet for AwardLedger {
    fn contains_participant(&self, id: &ParticipantId) -> bool {
        self.is_won(id)
    }
}
