//! Participants and the roster records they are built from

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable participant identity
///
/// Display names may repeat across the roster; the id never does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generated id for the n-th ingested participant
    pub fn generated(seq: u64) -> Self {
        Self(format!("p-{seq:04}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A person eligible to win
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    /// Display name, not unique
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            department: None,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Name with department suffix, for boards and logs
    pub fn label(&self) -> String {
        match &self.department {
            Some(dept) if !dept.is_empty() => format!("{} ({})", self.name, dept),
            _ => self.name.clone(),
        }
    }
}

/// Already-parsed roster record handed over by the import collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Explicit id; generated at ingestion when absent
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
}

impl RosterEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            department: None,
        }
    }

    /// Trimmed name and department, `None` if the name is blank
    pub fn normalized(&self) -> Option<(String, Option<String>)> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        let department = self
            .department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        Some((name.to_string(), department))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_padded() {
        assert_eq!(ParticipantId::generated(7).as_str(), "p-0007");
        assert_eq!(ParticipantId::generated(12345).as_str(), "p-12345");
    }

    #[test]
    fn test_label_includes_department() {
        let p = Participant::new("p-1", "Lin").with_department("Finance");
        assert_eq!(p.label(), "Lin (Finance)");
        assert_eq!(Participant::new("p-2", "Wu").label(), "Wu");
    }

    #[test]
    fn test_roster_entry_normalization() {
        let entry = RosterEntry {
            id: None,
            name: "  Zhao  ".into(),
            department: Some("   ".into()),
        };
        assert_eq!(entry.normalized(), Some(("Zhao".to_string(), None)));
        assert_eq!(RosterEntry::named("   ").normalized(), None);
    }

    #[test]
    fn test_participant_id_serializes_as_string() {
        let p = Participant::new("p-0001", "Qian");
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"id":"p-0001","name":"Qian"}"#);
    }
}
