//! Participant pool — the roster and its not-yet-won subset

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use ld_core::{LdError, LdResult, Participant, ParticipantId, RosterEntry};

use crate::ledger::AwardLedger;

/// Anything that can answer "has this participant already won?"
pub trait WonSet {
    fn contains_participant(&self, id: &ParticipantId) -> bool;
}

impl WonSet for HashSet<ParticipantId> {
    fn contains_participant(&self, id: &ParticipantId) -> bool {
        self.contains(id)
    }
}

/// Roster order, minus everyone in the won-set
pub fn available(roster: &[Participant], won: &impl WonSet) -> Vec<Participant> {
    roster
        .iter()
        .filter(|p| !won.contains_participant(&p.id))
        .cloned()
        .collect()
}

#[derive(Debug)]
struct AvailableCache {
    roster_revision: u64,
    ledger_tag: u64,
    ledger_revision: u64,
    available: Arc<[Participant]>,
}

/// The full roster, with a cached available subset
#[derive(Debug, Default)]
pub struct ParticipantPool {
    roster: Vec<Participant>,
    ids: HashSet<ParticipantId>,
    next_seq: u64,
    revision: u64,
    cache: Mutex<Option<AvailableCache>>,
}

impl ParticipantPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: &[RosterEntry]) -> LdResult<Self> {
        let mut pool = Self::new();
        pool.ingest(entries)?;
        Ok(pool)
    }

    /// Append normalized roster records, returning how many were added
    ///
    /// Blank names are dropped. A duplicate explicit id rejects the whole
    /// batch so the roster is never half-imported.
    pub fn ingest(&mut self, entries: &[RosterEntry]) -> LdResult<usize> {
        let mut batch_ids = HashSet::new();
        let mut seq = self.next_seq;
        let mut incoming = Vec::with_capacity(entries.len());

        for entry in entries {
            let Some((name, department)) = entry.normalized() else {
                log::debug!("[Pool] skipping blank roster entry");
                continue;
            };
            let id = match entry.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                Some(explicit) => ParticipantId::new(explicit),
                None => loop {
                    seq += 1;
                    let candidate = ParticipantId::generated(seq);
                    if !self.ids.contains(&candidate) && !batch_ids.contains(&candidate) {
                        break candidate;
                    }
                },
            };
            if self.ids.contains(&id) || !batch_ids.insert(id.clone()) {
                return Err(LdError::DuplicateParticipant(id));
            }
            incoming.push(Participant {
                id,
                name,
                department,
            });
        }

        let added = incoming.len();
        self.ids.extend(batch_ids);
        self.roster.extend(incoming);
        self.next_seq = seq;
        if added > 0 {
            self.revision += 1;
            log::info!("[Pool] ingested {} participant(s), roster size {}", added, self.roster.len());
        }
        Ok(added)
    }

    /// Add one fully-formed participant
    pub fn insert(&mut self, participant: Participant) -> LdResult<()> {
        if !self.ids.insert(participant.id.clone()) {
            return Err(LdError::DuplicateParticipant(participant.id));
        }
        self.roster.push(participant);
        self.revision += 1;
        Ok(())
    }

    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.ids.contains(id)
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.roster.iter().find(|p| &p.id == id)
    }

    /// Available subset against the ceremony's ledger
    ///
    /// Recomputed only when the roster or the ledger changed since the last
    /// call; the returned snapshot is unaffected by later changes.
    pub fn available(&self, ledger: &AwardLedger) -> Arc<[Participant]> {
        let mut cache = self.cache.lock();
        if let Some(hit) = cache.as_ref() {
            if hit.roster_revision == self.revision
                && hit.ledger_tag == ledger.tag()
                && hit.ledger_revision == ledger.revision()
            {
                return Arc::clone(&hit.available);
            }
        }

        let fresh: Arc<[Participant]> = available(&self.roster, ledger).into();
        log::debug!("[Pool] available refreshed: {} of {}", fresh.len(), self.roster.len());
        *cache = Some(AvailableCache {
            roster_revision: self.revision,
            ledger_tag: ledger.tag(),
            ledger_revision: ledger.revision(),
            available: Arc::clone(&fresh),
        });
        fresh
    }
}
