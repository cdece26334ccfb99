//! Ceremony configuration: roster records, awards, timing
//!
//! Files are JSON or YAML, picked by extension:
//!
//! ```yaml
//! title: Spring Gala
//! timing: normal
//! seed: 42
//! roster:
//!   - name: Ann
//!     department: Finance
//!   - { id: emp-7, name: Bo }
//! awards:
//!   - { name: Third prize, target_count: 10, batch_size: 3 }
//!   - { id: grand, name: Grand prize, target_count: 1 }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use ld_core::{AwardSpec, LdError, LdResult, RosterEntry};

use crate::ledger::AwardLedger;
use crate::planner::round_schedule;
use crate::pool::ParticipantPool;
use crate::timing::{TimingConfig, TimingProfile};

/// Everything needed to open a ceremony in setup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CeremonyConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub roster: Vec<RosterEntry>,
    #[serde(default)]
    pub awards: Vec<AwardSpec>,
    #[serde(default)]
    pub timing: TimingProfile,
    /// Fixed sampler seed for rehearsals
    #[serde(default)]
    pub seed: Option<u64>,
}

impl CeremonyConfig {
    /// Built-in ceremony: 88 numbered seats and three tiers
    pub fn demo() -> Self {
        Self {
            title: "Annual Gala".into(),
            roster: (1..=88)
                .map(|n| RosterEntry::named(format!("{n:02}")))
                .collect(),
            awards: vec![
                AwardSpec::new("Third prize", 10).with_id("3").with_batch_size(3),
                AwardSpec::new("Second prize", 6).with_id("2").with_batch_size(2),
                AwardSpec::new("First prize", 3).with_id("1").with_batch_size(1),
            ],
            timing: TimingProfile::Normal,
            seed: None,
        }
    }

    pub fn from_json(text: &str) -> LdResult<Self> {
        let mut config: Self =
            serde_json::from_str(text).map_err(|e| LdError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> LdResult<Self> {
        let mut config: Self =
            serde_yml::from_str(text).map_err(|e| LdError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from disk; `.yaml`/`.yml` parse as YAML, anything else as JSON
    pub fn load(path: impl AsRef<Path>) -> LdResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        log::info!("[Config] loading {}", path.display());
        if is_yaml {
            Self::from_yaml(&text)
        } else {
            Self::from_json(&text)
        }
    }

    /// Normalize and check the configuration
    pub fn validate(&mut self) -> LdResult<()> {
        let mut award_ids = HashSet::new();
        for award in &mut self.awards {
            if award.name.trim().is_empty() {
                return Err(LdError::InvalidConfig("award with an empty name".into()));
            }
            if award.batch_size == Some(0) {
                log::debug!("[Config] award '{}' has batch_size 0, drawing in one round", award.name);
                award.batch_size = None;
            }
            if let Some(id) = &award.id {
                if !award_ids.insert(id.clone()) {
                    return Err(LdError::DuplicateAward(id.as_str().into()));
                }
            }
        }

        let mut participant_ids = HashSet::new();
        for entry in &self.roster {
            if let Some(id) = &entry.id {
                if !participant_ids.insert(id.as_str()) {
                    return Err(LdError::DuplicateParticipant(id.as_str().into()));
                }
            }
        }
        Ok(())
    }

    pub fn timing_config(&self) -> TimingConfig {
        TimingConfig::from_profile(self.timing)
    }

    /// Winners all awards will draw in total
    pub fn total_target(&self) -> u64 {
        self.awards.iter().map(|a| u64::from(a.target_count)).sum()
    }

    /// Round sizes per award, for previewing the running order
    pub fn schedules(&self) -> Vec<(String, Vec<u32>)> {
        self.awards
            .iter()
            .map(|a| (a.name.clone(), round_schedule(a.target_count, a.batch_size, 0)))
            .collect()
    }

    /// Build the pool and ledger this configuration describes
    pub fn build(&self) -> LdResult<(ParticipantPool, AwardLedger)> {
        let pool = ParticipantPool::from_entries(&self.roster)?;
        let ledger = AwardLedger::from_specs(self.awards.iter().cloned())?;
        if self.total_target() > pool.len() as u64 {
            log::warn!(
                "[Config] awards want {} winners but the roster has {}",
                self.total_target(),
                pool.len()
            );
        }
        Ok((pool, ledger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const JSON: &str = r#"{
        "title": "Spring Gala",
        "timing": "brisk",
        "seed": 7,
        "roster": [
            { "name": "Ann", "department": "Finance" },
            { "id": "emp-7", "name": "Bo" },
            { "name": "   " }
        ],
        "awards": [
            { "name": "Third prize", "target_count": 10, "batch_size": 3 },
            { "id": "grand", "name": "Grand prize", "target_count": 1, "batch_size": 0 }
        ]
    }"#;

    #[test]
    fn test_parse_json() {
        let config = CeremonyConfig::from_json(JSON).unwrap();
        assert_eq!(config.title, "Spring Gala");
        assert_eq!(config.timing, TimingProfile::Brisk);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.awards[1].batch_size, None);

        let (pool, ledger) = config.build().unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.awards()[1].id.as_str(), "grand");
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = "
roster:
  - name: Ann
  - name: Bo
awards:
  - name: Lucky
    target_count: 2
";
        let config = CeremonyConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.timing, TimingProfile::Normal);
        assert_eq!(config.roster.len(), 2);
        assert_eq!(config.awards[0].target_count, 2);
    }

    #[test]
    fn test_load_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "awards:\n  - {{ name: One, target_count: 1 }}").unwrap();
        let config = CeremonyConfig::load(file.path()).unwrap();
        assert_eq!(config.awards.len(), 1);

        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{JSON}").unwrap();
        assert!(CeremonyConfig::load(file.path()).is_ok());
    }

    #[test]
    fn test_rejects_duplicates_and_blank_names() {
        let dup_award = r#"{ "awards": [
            { "id": "x", "name": "A", "target_count": 1 },
            { "id": "x", "name": "B", "target_count": 1 } ] }"#;
        assert!(matches!(
            CeremonyConfig::from_json(dup_award),
            Err(LdError::DuplicateAward(_))
        ));

        let blank = r#"{ "awards": [ { "name": " ", "target_count": 1 } ] }"#;
        assert!(matches!(
            CeremonyConfig::from_json(blank),
            Err(LdError::InvalidConfig(_))
        ));

        assert!(matches!(
            CeremonyConfig::from_json("not json"),
            Err(LdError::Serialization(_))
        ));
    }

    #[test]
    fn test_demo_schedules() {
        let demo = CeremonyConfig::demo();
        assert_eq!(demo.roster.len(), 88);
        let schedules = demo.schedules();
        assert_eq!(schedules[0].1, vec![3, 3, 4]);
        assert_eq!(schedules[1].1, vec![2, 2, 2]);
        assert_eq!(schedules[2].1, vec![1, 1, 1]);
        assert_eq!(demo.total_target(), 19);
    }
}
