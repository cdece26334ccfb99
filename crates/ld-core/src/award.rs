//! Awards (prize tiers) and their configuration records

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::participant::Participant;

/// Stable award identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AwardId(String);

impl AwardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generated id for the n-th configured award
    pub fn generated(seq: u64) -> Self {
        Self(format!("a-{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AwardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AwardId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AwardId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A prize tier and the winners drawn for it so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub id: AwardId,
    pub name: String,
    /// Total winners this award will ultimately have
    pub target_count: u32,
    /// Per-round batch size; `None` draws everything in one round
    #[serde(default)]
    pub batch_size: Option<u32>,
    /// Winners in draw order. Only the ledger mutates this.
    #[serde(default)]
    pub winners: Vec<Participant>,
    #[serde(default)]
    pub prize_images: Vec<String>,
}

impl Award {
    pub fn new(id: impl Into<AwardId>, name: impl Into<String>, target_count: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            target_count,
            batch_size: None,
            winners: Vec::new(),
            prize_images: Vec::new(),
        }
    }

    /// Builder: set batch size (zero means no batching)
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = (batch_size > 0).then_some(batch_size);
        self
    }

    /// Winners still to be drawn
    pub fn remaining(&self) -> u32 {
        self.target_count.saturating_sub(self.winners.len() as u32)
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Effective batch size, treating zero as absent
    pub fn effective_batch(&self) -> Option<u32> {
        self.batch_size.filter(|&b| b > 0)
    }
}

/// Award configuration record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardSpec {
    /// Explicit id; generated when absent
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub target_count: u32,
    #[serde(default)]
    pub batch_size: Option<u32>,
    #[serde(default)]
    pub prize_images: Vec<String>,
}

impl AwardSpec {
    pub fn new(name: impl Into<String>, target_count: u32) -> Self {
        Self {
            id: None,
            name: name.into(),
            target_count,
            batch_size: None,
            prize_images: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Build an empty award under the given id
    pub fn into_award(self, id: AwardId) -> Award {
        Award {
            id,
            name: self.name,
            target_count: self.target_count,
            batch_size: self.batch_size.filter(|&b| b > 0),
            winners: Vec::new(),
            prize_images: self.prize_images,
        }
    }
}

impl Default for AwardSpec {
    fn default() -> Self {
        Self::new("New award", 1)
    }
}

/// Partial edit applied to an award during setup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target_count: Option<u32>,
    /// `Some(None)` clears the batch size
    #[serde(default)]
    pub batch_size: Option<Option<u32>>,
}

impl AwardUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.target_count.is_none() && self.batch_size.is_none()
    }
}
